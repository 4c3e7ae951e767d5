//! Identity assembly.
//!
//! An [`Identity`] is the scheme-tagged bundle of subject and claims that one
//! authorization decision (or one issued token) is made against. It is never
//! persisted.

use serde::{Deserialize, Serialize};

use warden_core::UserId;

use crate::{AuthError, Claim, ClaimSet, PermissionStore, User, expand_effective_claims};

/// Channel an identity was minted for.
///
/// Claims are not portable between schemes: a cookie identity replayed as a
/// bearer token (or the reverse) is rejected by the gate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Cookie,
    Bearer,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Cookie => "cookie",
            Scheme::Bearer => "bearer",
        }
    }
}

impl core::fmt::Display for Scheme {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub scheme: Scheme,
    pub user_id: UserId,
    /// Username of the authenticated account.
    pub subject: String,
    pub claims: ClaimSet,
}

impl Identity {
    pub fn has_claim(&self, claim: &Claim) -> bool {
        self.claims.contains(claim)
    }
}

/// Build an identity from an already-resolved user and claim set.
///
/// Pure; `scheme` is carried through unchanged.
pub fn build_identity(user: &User, claims: ClaimSet, scheme: Scheme) -> Identity {
    Identity {
        scheme,
        user_id: user.id,
        subject: user.username.clone(),
        claims,
    }
}

/// Resolve `username`, expand its claims and build an identity for `scheme`.
///
/// A missing account is `NotFound`; this never falls back to an empty claim set.
pub async fn assemble_identity(
    store: &dyn PermissionStore,
    username: &str,
    scheme: Scheme,
) -> Result<Identity, AuthError> {
    let user = store
        .find_user_by_name(username)
        .await?
        .ok_or_else(|| AuthError::NotFound(format!("user {username}")))?;

    let claims = expand_effective_claims(store, user.id).await?;
    Ok(build_identity(&user, claims, scheme))
}
