use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use warden_auth::{
    Claim, ClaimId, NewUser, PermissionAdmin, PermissionStore, Role, RoleClaim, RoleName, User,
    UserUpdate,
};
use warden_core::{DomainError, DomainResult, RoleId, UserId};

use crate::password::{Argon2PasswordHasher, PasswordHasher};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<UserId, StoredUser>,
    roles: BTreeMap<RoleId, Role>,
    memberships: BTreeSet<(UserId, RoleId)>,
    next_claim_id: ClaimId,
}

impl State {
    fn user_by_name(&self, username: &str) -> Option<&StoredUser> {
        let wanted = username.to_lowercase();
        self.users
            .values()
            .find(|u| u.user.username.to_lowercase() == wanted)
    }

    fn role_by_name(&self, name: &RoleName) -> Option<&Role> {
        self.roles.values().find(|r| &r.name == name)
    }

    fn require_user(&self, user_id: UserId) -> DomainResult<&StoredUser> {
        self.users
            .get(&user_id)
            .ok_or_else(|| DomainError::not_found(format!("user {user_id}")))
    }

    fn require_role_by_name(&self, name: &RoleName) -> DomainResult<&Role> {
        self.role_by_name(name)
            .ok_or_else(|| DomainError::not_found(format!("role {name}")))
    }
}

/// In-memory permission store for tests/dev.
///
/// Usernames are matched case-insensitively. Passwords are kept as Argon2id
/// hashes. Deleting a role cascades to its claims and memberships.
pub struct InMemoryPermissionStore {
    inner: RwLock<State>,
    hasher: Arc<dyn PasswordHasher>,
}

impl InMemoryPermissionStore {
    pub fn new() -> Self {
        Self::with_hasher(Arc::new(Argon2PasswordHasher::new()))
    }

    pub fn with_hasher(hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            inner: RwLock::new(State {
                next_claim_id: 1,
                ..State::default()
            }),
            hasher,
        }
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, State>> {
        self.inner
            .read()
            .map_err(|_| DomainError::unavailable("permission store lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, State>> {
        self.inner
            .write()
            .map_err(|_| DomainError::unavailable("permission store lock poisoned"))
    }
}

impl Default for InMemoryPermissionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for InMemoryPermissionStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryPermissionStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn find_user_by_name(&self, username: &str) -> DomainResult<Option<User>> {
        Ok(self.read()?.user_by_name(username).map(|u| u.user.clone()))
    }

    async fn find_user_by_id(&self, user_id: UserId) -> DomainResult<Option<User>> {
        Ok(self.read()?.users.get(&user_id).map(|u| u.user.clone()))
    }

    async fn verify_credential(&self, username: &str, password: &str) -> DomainResult<bool> {
        let stored_hash = self
            .read()?
            .user_by_name(username)
            .map(|u| u.password_hash.clone());

        match stored_hash {
            Some(hash) => self.hasher.verify_password(password, &hash),
            None => {
                // Burn the same work as a real verification.
                let _ = self.hasher.hash_password(password);
                Ok(false)
            }
        }
    }

    async fn roles_for_user(&self, user_id: UserId) -> DomainResult<Vec<RoleName>> {
        let state = self.read()?;
        Ok(state
            .memberships
            .iter()
            .filter(|(u, _)| *u == user_id)
            .filter_map(|(_, r)| state.roles.get(r).map(|role| role.name.clone()))
            .collect())
    }

    async fn claims_for_role(&self, role: &RoleName) -> DomainResult<Vec<Claim>> {
        let state = self.read()?;
        let role = state.require_role_by_name(role)?;
        Ok(role.claims.iter().map(|c| c.claim.clone()).collect())
    }

    async fn is_user_in_role(&self, user_id: UserId, role: &RoleName) -> DomainResult<bool> {
        let state = self.read()?;
        Ok(state
            .role_by_name(role)
            .is_some_and(|r| state.memberships.contains(&(user_id, r.id))))
    }
}

#[async_trait]
impl PermissionAdmin for InMemoryPermissionStore {
    async fn list_roles(&self) -> DomainResult<Vec<Role>> {
        Ok(self.read()?.roles.values().cloned().collect())
    }

    async fn find_role_by_id(&self, role_id: RoleId) -> DomainResult<Option<Role>> {
        Ok(self.read()?.roles.get(&role_id).cloned())
    }

    async fn find_role_by_name(&self, name: &RoleName) -> DomainResult<Option<Role>> {
        Ok(self.read()?.role_by_name(name).cloned())
    }

    async fn create_role(&self, name: RoleName) -> DomainResult<Role> {
        if name.as_str().trim().is_empty() {
            return Err(DomainError::validation("role name cannot be empty"));
        }

        let mut state = self.write()?;
        if state.role_by_name(&name).is_some() {
            return Err(DomainError::conflict(format!("role {name} already exists")));
        }

        let role = Role {
            id: RoleId::new(),
            name,
            claims: Vec::new(),
        };
        state.roles.insert(role.id, role.clone());
        tracing::debug!(role = %role.name, "role created");
        Ok(role)
    }

    async fn delete_role(&self, role_id: RoleId) -> DomainResult<()> {
        let mut state = self.write()?;
        if state.roles.remove(&role_id).is_none() {
            return Err(DomainError::not_found(format!("role {role_id}")));
        }
        state.memberships.retain(|(_, r)| *r != role_id);
        Ok(())
    }

    async fn add_role_claim(&self, role_id: RoleId, claim: Claim) -> DomainResult<ClaimId> {
        if claim.claim_type().trim().is_empty() || claim.claim_value().trim().is_empty() {
            return Err(DomainError::validation("claim type and value are required"));
        }

        let mut state = self.write()?;
        let id = state.next_claim_id;
        let role = state
            .roles
            .get_mut(&role_id)
            .ok_or_else(|| DomainError::not_found(format!("role {role_id}")))?;
        role.claims.push(RoleClaim { id, claim });
        state.next_claim_id += 1;
        Ok(id)
    }

    async fn remove_role_claim(&self, role_id: RoleId, claim_id: ClaimId) -> DomainResult<()> {
        let mut state = self.write()?;
        let role = state
            .roles
            .get_mut(&role_id)
            .ok_or_else(|| DomainError::not_found(format!("role {role_id}")))?;

        let before = role.claims.len();
        role.claims.retain(|c| c.id != claim_id);
        if role.claims.len() == before {
            return Err(DomainError::not_found(format!("claim {claim_id}")));
        }
        Ok(())
    }

    async fn list_users(&self) -> DomainResult<Vec<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .filter(|u| !u.user.deleted)
            .map(|u| u.user.clone())
            .collect())
    }

    async fn create_user(&self, new_user: NewUser, password: &str) -> DomainResult<User> {
        let username = new_user.username.trim().to_string();
        if username.is_empty() {
            return Err(DomainError::validation("username cannot be empty"));
        }
        if password.is_empty() {
            return Err(DomainError::validation("password cannot be empty"));
        }

        let password_hash = self.hasher.hash_password(password)?;

        let mut state = self.write()?;
        if state.user_by_name(&username).is_some() {
            return Err(DomainError::conflict(format!("username {username} is taken")));
        }

        let user = User {
            id: UserId::new(),
            username,
            email: new_user.email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            is_active: new_user.is_active,
            deleted: false,
        };
        state.users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash,
            },
        );
        Ok(user)
    }

    async fn update_user(&self, user_id: UserId, update: UserUpdate) -> DomainResult<User> {
        let mut state = self.write()?;
        let stored = state
            .users
            .get_mut(&user_id)
            .filter(|u| !u.user.deleted)
            .ok_or_else(|| DomainError::not_found(format!("user {user_id}")))?;

        let user = &mut stored.user;
        if let Some(email) = update.email {
            user.email = Some(email);
        }
        if let Some(first_name) = update.first_name {
            user.first_name = Some(first_name);
        }
        if let Some(last_name) = update.last_name {
            user.last_name = Some(last_name);
        }
        if let Some(is_active) = update.is_active {
            user.is_active = is_active;
        }
        Ok(user.clone())
    }

    async fn soft_delete_user(&self, user_id: UserId) -> DomainResult<()> {
        let mut state = self.write()?;
        let stored = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| DomainError::not_found(format!("user {user_id}")))?;
        stored.user.deleted = true;
        Ok(())
    }

    async fn add_user_to_role(&self, user_id: UserId, role: &RoleName) -> DomainResult<()> {
        let mut state = self.write()?;
        state.require_user(user_id)?;
        let role_id = state.require_role_by_name(role)?.id;

        if !state.memberships.insert((user_id, role_id)) {
            return Err(DomainError::conflict(format!("user already holds role {role}")));
        }
        Ok(())
    }

    async fn remove_user_from_role(&self, user_id: UserId, role: &RoleName) -> DomainResult<()> {
        let mut state = self.write()?;
        state.require_user(user_id)?;
        let role_id = state.require_role_by_name(role)?.id;

        if !state.memberships.remove(&(user_id, role_id)) {
            return Err(DomainError::not_found(format!("membership in role {role}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_auth::{admin, expand_effective_claims};

    /// Plain-text hasher so tests don't pay for Argon2.
    struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash_password(&self, password: &str) -> DomainResult<String> {
            Ok(format!("plain:{password}"))
        }

        fn verify_password(&self, password: &str, hash: &str) -> DomainResult<bool> {
            Ok(hash == format!("plain:{password}"))
        }
    }

    fn store() -> InMemoryPermissionStore {
        InMemoryPermissionStore::with_hasher(Arc::new(PlainHasher))
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: Some(username.to_string()),
            first_name: None,
            last_name: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn usernames_are_unique_ignoring_case() {
        let store = store();
        store.create_user(new_user("Alice@Example.com"), "pw").await.unwrap();

        let found = store.find_user_by_name("alice@example.com").await.unwrap();
        assert!(found.is_some());

        let err = store
            .create_user(new_user("ALICE@example.com"), "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn username_case_folding_covers_non_ascii_letters() {
        let store = store();
        store.create_user(new_user("Ärger@Example.com"), "pw").await.unwrap();

        assert!(store.find_user_by_name("ärger@example.com").await.unwrap().is_some());
        assert!(store.verify_credential("ÄRGER@EXAMPLE.COM", "pw").await.unwrap());

        let err = store
            .create_user(new_user("ärger@example.com"), "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn verify_credential_checks_the_hash() {
        let store = store();
        store.create_user(new_user("bob"), "secret").await.unwrap();

        assert!(store.verify_credential("BOB", "secret").await.unwrap());
        assert!(!store.verify_credential("bob", "Secret").await.unwrap());
        assert!(!store.verify_credential("nobody", "secret").await.unwrap());
    }

    #[tokio::test]
    async fn deleting_a_role_cascades_claims_and_memberships() {
        let store = store();
        let user = store.create_user(new_user("carol"), "pw").await.unwrap();
        let role = store.create_role(RoleName::new("Editor")).await.unwrap();
        store.add_role_claim(role.id, admin::CREATE_ROLE).await.unwrap();
        store.add_user_to_role(user.id, &role.name).await.unwrap();

        let before = expand_effective_claims(&store, user.id).await.unwrap();
        assert!(before.contains(&admin::CREATE_ROLE));

        store.delete_role(role.id).await.unwrap();

        assert!(!store.is_user_in_role(user.id, &role.name).await.unwrap());
        assert!(store.roles_for_user(user.id).await.unwrap().is_empty());
        assert!(matches!(
            store.claims_for_role(&role.name).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(expand_effective_claims(&store, user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn role_claims_are_removed_by_id() {
        let store = store();
        let role = store.create_role(RoleName::new("Reader")).await.unwrap();
        let view = store.add_role_claim(role.id, admin::VIEW_ROLE).await.unwrap();
        store.add_role_claim(role.id, admin::LIST_ROLES).await.unwrap();

        store.remove_role_claim(role.id, view).await.unwrap();

        let claims = store.claims_for_role(&role.name).await.unwrap();
        assert_eq!(claims, vec![admin::LIST_ROLES]);
        assert!(matches!(
            store.remove_role_claim(role.id, view).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_role_names_conflict() {
        let store = store();
        store.create_role(RoleName::new("Basic")).await.unwrap();
        assert!(matches!(
            store.create_role(RoleName::new("Basic")).await,
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            store.create_role(RoleName::new("  ")).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn soft_deleted_users_are_hidden_from_listing_but_kept() {
        let store = store();
        let user = store.create_user(new_user("dave"), "pw").await.unwrap();
        store.create_user(new_user("erin"), "pw").await.unwrap();

        store.soft_delete_user(user.id).await.unwrap();

        let listed: Vec<String> = store
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(listed, vec!["erin".to_string()]);

        let kept = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert!(kept.deleted);
        assert!(!kept.can_authenticate());
    }

    #[tokio::test]
    async fn membership_changes_are_visible_immediately() {
        let store = store();
        let user = store.create_user(new_user("frank"), "pw").await.unwrap();
        let role = store.create_role(RoleName::new("Auditor")).await.unwrap();
        store.add_role_claim(role.id, admin::LIST_USERS).await.unwrap();

        store.add_user_to_role(user.id, &role.name).await.unwrap();
        assert!(matches!(
            store.add_user_to_role(user.id, &role.name).await,
            Err(DomainError::Conflict(_))
        ));
        assert_eq!(expand_effective_claims(&store, user.id).await.unwrap().len(), 1);

        store.remove_user_from_role(user.id, &role.name).await.unwrap();
        assert!(expand_effective_claims(&store, user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_user_toggles_active_flag() {
        let store = store();
        let user = store.create_user(new_user("gina"), "pw").await.unwrap();

        let updated = store
            .update_user(
                user.id,
                UserUpdate {
                    is_active: Some(false),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap();

        assert!(!updated.is_active);
        assert_eq!(updated.email.as_deref(), Some("gina"));
    }
}
