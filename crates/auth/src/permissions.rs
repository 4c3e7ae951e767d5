use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The single claim type under which every permission is granted.
pub const PERMISSION_CLAIM_TYPE: &str = "app.permission";

/// A `(type, value)` permission token attached to a role.
///
/// Ordering is lexicographic by type, then value; `ClaimSet` relies on this to
/// produce a stable encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub claim_type: Cow<'static, str>,
    pub claim_value: Cow<'static, str>,
}

impl Claim {
    pub fn new(
        claim_type: impl Into<Cow<'static, str>>,
        claim_value: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            claim_type: claim_type.into(),
            claim_value: claim_value.into(),
        }
    }

    /// A claim in the permission namespace.
    pub const fn permission(value: &'static str) -> Self {
        Self {
            claim_type: Cow::Borrowed(PERMISSION_CLAIM_TYPE),
            claim_value: Cow::Borrowed(value),
        }
    }

    pub fn claim_type(&self) -> &str {
        &self.claim_type
    }

    pub fn claim_value(&self) -> &str {
        &self.claim_value
    }
}

impl core::fmt::Display for Claim {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}->{}", self.claim_type, self.claim_value)
    }
}

/// Deduplicated, ordered set of claims.
///
/// Equality is set equality; iteration order is always sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(BTreeSet<Claim>);

impl ClaimSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn insert(&mut self, claim: Claim) -> bool {
        self.0.insert(claim)
    }

    /// Exact, case-sensitive membership test.
    pub fn contains(&self, claim: &Claim) -> bool {
        self.0.contains(claim)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Claim> {
        self.0.iter()
    }

    pub fn is_subset(&self, other: &ClaimSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn into_vec(self) -> Vec<Claim> {
        self.0.into_iter().collect()
    }
}

impl FromIterator<Claim> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = Claim>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Claim> for ClaimSet {
    fn extend<I: IntoIterator<Item = Claim>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl IntoIterator for ClaimSet {
    type Item = Claim;
    type IntoIter = std::collections::btree_set::IntoIter<Claim>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Permission values declared by the administrative endpoints.
pub mod admin {
    use super::Claim;

    pub const ASSIGN_ROLE: Claim = Claim::permission("assign.role");
    pub const CREATE_ROLE: Claim = Claim::permission("create.role");
    pub const DELETE_ROLE: Claim = Claim::permission("delete.role");
    pub const LIST_ROLES: Claim = Claim::permission("list.roles");
    pub const REVOKE_ROLE: Claim = Claim::permission("revoke.role");
    pub const VIEW_ROLE: Claim = Claim::permission("view.role");

    pub const LIST_USERS: Claim = Claim::permission("list.users");
    pub const LIST_USER_CLAIMS: Claim = Claim::permission("list.user-claims");
    pub const VIEW_USER: Claim = Claim::permission("view.user");
    pub const UPDATE_USER: Claim = Claim::permission("update.user");
    pub const DELETE_USER: Claim = Claim::permission("delete.user");
    pub const CREATE_USER: Claim = Claim::permission("create.user");

    pub const DELETE_ROLE_CLAIM: Claim = Claim::permission("delete.role-claim");
    pub const CREATE_CLAIM: Claim = Claim::permission("create.claim");
    pub const VIEW_CLAIM: Claim = Claim::permission("view.claim");
    pub const LIST_ROLE_CLAIMS: Claim = Claim::permission("list.role-claims");

    /// Every permission above, for seeding an administrator role.
    pub const ALL: [Claim; 16] = [
        ASSIGN_ROLE,
        CREATE_ROLE,
        DELETE_ROLE,
        LIST_ROLES,
        REVOKE_ROLE,
        VIEW_ROLE,
        LIST_USERS,
        LIST_USER_CLAIMS,
        VIEW_USER,
        UPDATE_USER,
        DELETE_USER,
        CREATE_USER,
        DELETE_ROLE_CLAIM,
        CREATE_CLAIM,
        VIEW_CLAIM,
        LIST_ROLE_CLAIMS,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_set_dedups_and_sorts_by_type_then_value() {
        let set: ClaimSet = [
            Claim::new("b.type", "a"),
            Claim::permission("view.role"),
            Claim::permission("assign.role"),
            Claim::permission("view.role"),
        ]
        .into_iter()
        .collect();

        let values: Vec<String> = set.iter().map(|c| c.to_string()).collect();
        assert_eq!(
            values,
            vec![
                "app.permission->assign.role",
                "app.permission->view.role",
                "b.type->a",
            ]
        );
    }

    #[test]
    fn membership_is_case_sensitive() {
        let set: ClaimSet = [Claim::permission("view.role")].into_iter().collect();
        assert!(set.contains(&Claim::permission("view.role")));
        assert!(!set.contains(&Claim::permission("View.Role")));
        assert!(!set.contains(&Claim::new("APP.PERMISSION", "view.role")));
    }

    #[test]
    fn borrowed_and_owned_claims_compare_equal() {
        let owned = Claim::new(String::from("app.permission"), String::from("list.users"));
        assert_eq!(owned, admin::LIST_USERS);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let json = serde_json::to_value(admin::VIEW_ROLE).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "claimType": "app.permission", "claimValue": "view.role" })
        );
    }
}
