use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use warden_core::RoleId;

use crate::Claim;

/// Role name used as the join key between memberships and claims.
///
/// Names are human-assigned and compared exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(Cow<'static, str>);

impl RoleName {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RoleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a claim row within the store.
pub type ClaimId = u64;

/// A claim as owned by a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleClaim {
    pub id: ClaimId,
    #[serde(flatten)]
    pub claim: Claim,
}

/// A role together with the claims it exclusively owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: RoleName,
    pub claims: Vec<RoleClaim>,
}
