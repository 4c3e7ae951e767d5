//! Request-time authorization gate.
//!
//! Per request the gate moves through
//! `Unauthenticated -> Identity-Decoded -> Permission-Checked -> {Allowed | Denied}`.
//! Every way of failing (no credential, bad signature, expired, wrong channel,
//! missing permission) collapses to [`AuthError::Unauthorized`].

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{AuthConfig, AuthError, Claim, Hs256JwtCodec, Identity, JwtValidator, Scheme};

/// A credential as presented on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credential<'a> {
    /// Channel the credential arrived on.
    pub channel: Scheme,
    pub token: &'a str,
}

impl<'a> Credential<'a> {
    pub fn bearer(token: &'a str) -> Self {
        Self {
            channel: Scheme::Bearer,
            token,
        }
    }

    pub fn cookie(token: &'a str) -> Self {
        Self {
            channel: Scheme::Cookie,
            token,
        }
    }
}

/// Decides allow/deny for a declared permission. Holds no mutable state and
/// performs no store IO.
#[derive(Clone)]
pub struct AuthorizationGate {
    validator: Arc<dyn JwtValidator>,
}

impl AuthorizationGate {
    pub fn new(config: &AuthConfig) -> Self {
        Self::with_validator(Arc::new(Hs256JwtCodec::new(&config.signing_secret)))
    }

    pub fn with_validator(validator: Arc<dyn JwtValidator>) -> Self {
        Self { validator }
    }

    /// Unauthenticated -> Identity-Decoded.
    ///
    /// The decoded identity must have been minted for the channel it was
    /// presented on.
    pub fn decode(
        &self,
        credential: Option<Credential<'_>>,
        now: DateTime<Utc>,
    ) -> Result<Identity, AuthError> {
        let credential = credential.ok_or(AuthError::Unauthorized)?;

        let identity = self
            .validator
            .validate(credential.token, now)
            .map_err(|_| AuthError::Unauthorized)?
            .into_identity();

        match (credential.channel, identity.scheme) {
            (Scheme::Bearer, Scheme::Bearer) | (Scheme::Cookie, Scheme::Cookie) => Ok(identity),
            (Scheme::Bearer, Scheme::Cookie) | (Scheme::Cookie, Scheme::Bearer) => {
                Err(AuthError::Unauthorized)
            }
        }
    }

    /// Full gate: decode, then check `required`. Returns the identity when allowed.
    pub fn check(
        &self,
        credential: Option<Credential<'_>>,
        required: &Claim,
        now: DateTime<Utc>,
    ) -> Result<Identity, AuthError> {
        let identity = self.decode(credential, now)?;
        authorize(&identity, required)?;
        Ok(identity)
    }
}

/// Identity-Decoded -> Permission-Checked.
///
/// Allowed iff the identity carries exactly `required` (case-sensitive, no
/// wildcards, no hierarchy).
pub fn authorize(identity: &Identity, required: &Claim) -> Result<(), AuthError> {
    if identity.has_claim(required) {
        Ok(())
    } else {
        Err(AuthError::Unauthorized)
    }
}
