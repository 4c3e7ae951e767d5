//! User account record as seen by the authorization core.

use serde::{Deserialize, Serialize};

use warden_core::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Unique, compared case-insensitively by the store.
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    /// Soft-delete marker; deleted accounts stay in the store.
    pub deleted: bool,
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: None,
            first_name: None,
            last_name: None,
            is_active: true,
            deleted: false,
        }
    }

    /// An account may authenticate only when enabled and not soft-deleted.
    pub fn can_authenticate(&self) -> bool {
        self.is_active && !self.deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleted_or_disabled_accounts_cannot_authenticate() {
        let mut user = User::new(UserId::new(), "alice@example.com");
        assert!(user.can_authenticate());

        user.deleted = true;
        assert!(!user.can_authenticate());

        user.deleted = false;
        user.is_active = false;
        assert!(!user.can_authenticate());
    }
}
