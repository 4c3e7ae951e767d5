//! Fixed in-memory permission store for unit tests.

use std::collections::HashMap;

use async_trait::async_trait;

use warden_core::{DomainError, DomainResult, UserId};

use crate::{Claim, PermissionStore, RoleName, User};

#[derive(Debug, Clone, Default)]
pub(crate) struct StaticStore {
    users: Vec<(User, String, Vec<RoleName>)>,
    roles: HashMap<RoleName, Vec<Claim>>,
    claims_failure: Option<DomainError>,
}

impl StaticStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_role(mut self, name: &str, claims: impl IntoIterator<Item = Claim>) -> Self {
        self.roles
            .insert(RoleName::new(name.to_string()), claims.into_iter().collect());
        self
    }

    pub(crate) fn with_user(mut self, username: &str, password: &str, roles: &[&str]) -> Self {
        let roles = roles.iter().map(|r| RoleName::new(r.to_string())).collect();
        self.users
            .push((User::new(UserId::new(), username), password.to_string(), roles));
        self
    }

    pub(crate) fn grant(mut self, username: &str, role: &str) -> Self {
        if let Some((_, _, roles)) = self.users.iter_mut().find(|(u, _, _)| u.username == username) {
            roles.push(RoleName::new(role.to_string()));
        }
        self
    }

    pub(crate) fn soft_delete(mut self, username: &str) -> Self {
        self.user_mut(username).deleted = true;
        self
    }

    pub(crate) fn deactivate(mut self, username: &str) -> Self {
        self.user_mut(username).is_active = false;
        self
    }

    pub(crate) fn failing_claims(mut self, err: DomainError) -> Self {
        self.claims_failure = Some(err);
        self
    }

    pub(crate) fn user_id(&self, username: &str) -> UserId {
        self.find(username).map(|(u, _, _)| u.id).unwrap()
    }

    fn user_mut(&mut self, username: &str) -> &mut User {
        self.users
            .iter_mut()
            .find(|(u, _, _)| u.username == username)
            .map(|(u, _, _)| u)
            .unwrap()
    }

    fn find(&self, username: &str) -> Option<&(User, String, Vec<RoleName>)> {
        let wanted = username.to_lowercase();
        self.users
            .iter()
            .find(|(u, _, _)| u.username.to_lowercase() == wanted)
    }
}

#[async_trait]
impl PermissionStore for StaticStore {
    async fn find_user_by_name(&self, username: &str) -> DomainResult<Option<User>> {
        Ok(self.find(username).map(|(u, _, _)| u.clone()))
    }

    async fn find_user_by_id(&self, user_id: UserId) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|(u, _, _)| u.id == user_id)
            .map(|(u, _, _)| u.clone()))
    }

    async fn verify_credential(&self, username: &str, password: &str) -> DomainResult<bool> {
        Ok(self.find(username).is_some_and(|(_, p, _)| p == password))
    }

    async fn roles_for_user(&self, user_id: UserId) -> DomainResult<Vec<RoleName>> {
        Ok(self
            .users
            .iter()
            .find(|(u, _, _)| u.id == user_id)
            .map(|(_, _, roles)| roles.clone())
            .unwrap_or_default())
    }

    async fn claims_for_role(&self, role: &RoleName) -> DomainResult<Vec<Claim>> {
        if let Some(err) = &self.claims_failure {
            return Err(err.clone());
        }
        self.roles
            .get(role)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("role {role}")))
    }

    async fn is_user_in_role(&self, user_id: UserId, role: &RoleName) -> DomainResult<bool> {
        Ok(self.roles_for_user(user_id).await?.contains(role))
    }
}
