//! Permission store ports.
//!
//! The authorization core only reads through [`PermissionStore`]. Role and
//! account administration goes through [`PermissionAdmin`], which the HTTP
//! layer consumes directly.

use async_trait::async_trait;

use warden_core::{DomainResult, RoleId, UserId};

use crate::{Claim, ClaimId, Role, RoleName, User};

/// Read interface consumed by the expander, issuer and assembler.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Case-insensitive lookup by username.
    async fn find_user_by_name(&self, username: &str) -> DomainResult<Option<User>>;

    async fn find_user_by_id(&self, user_id: UserId) -> DomainResult<Option<User>>;

    /// Checks the password only; account state is the caller's concern.
    ///
    /// Implementations should spend comparable time whether or not the user exists.
    async fn verify_credential(&self, username: &str, password: &str) -> DomainResult<bool>;

    async fn roles_for_user(&self, user_id: UserId) -> DomainResult<Vec<RoleName>>;

    /// Fails with `NotFound` when the role does not exist.
    async fn claims_for_role(&self, role: &RoleName) -> DomainResult<Vec<Claim>>;

    async fn is_user_in_role(&self, user_id: UserId, role: &RoleName) -> DomainResult<bool>;
}

/// Fields accepted when creating an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
}

/// Mutable profile fields of an account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
}

/// Write interface for role and account administration.
#[async_trait]
pub trait PermissionAdmin: PermissionStore {
    async fn list_roles(&self) -> DomainResult<Vec<Role>>;

    async fn find_role_by_id(&self, role_id: RoleId) -> DomainResult<Option<Role>>;

    async fn find_role_by_name(&self, name: &RoleName) -> DomainResult<Option<Role>>;

    async fn create_role(&self, name: RoleName) -> DomainResult<Role>;

    /// Removes the role, its claims and every membership referencing it.
    async fn delete_role(&self, role_id: RoleId) -> DomainResult<()>;

    async fn add_role_claim(&self, role_id: RoleId, claim: Claim) -> DomainResult<ClaimId>;

    async fn remove_role_claim(&self, role_id: RoleId, claim_id: ClaimId) -> DomainResult<()>;

    /// Lists accounts that are not soft-deleted.
    async fn list_users(&self) -> DomainResult<Vec<User>>;

    async fn create_user(&self, user: NewUser, password: &str) -> DomainResult<User>;

    async fn update_user(&self, user_id: UserId, update: UserUpdate) -> DomainResult<User>;

    async fn soft_delete_user(&self, user_id: UserId) -> DomainResult<()>;

    /// Fails with `Conflict` when the membership already exists.
    async fn add_user_to_role(&self, user_id: UserId, role: &RoleName) -> DomainResult<()>;

    async fn remove_user_from_role(&self, user_id: UserId, role: &RoleName) -> DomainResult<()>;
}
