//! Service wiring shared by every handler.

use std::sync::Arc;

use warden_auth::{
    AuthError, NewUser, PermissionAdmin, PermissionStore, Role, RoleName, TokenIssuer,
    admin,
};
use warden_core::DomainError;
use warden_infra::InMemoryPermissionStore;

use crate::config::ApiConfig;

/// Role seeded with every administrative permission.
pub const ADMINISTRATOR_ROLE: &str = "Administrator";

pub struct AppServices {
    /// Read port used by the authorization core.
    pub store: Arc<dyn PermissionStore>,
    /// Administration port over the same store.
    pub admin: Arc<dyn PermissionAdmin>,
    pub issuer: TokenIssuer,
    pub default_role: RoleName,
    pub session_cookie: String,
}

impl AppServices {
    pub fn new<S>(config: &ApiConfig, store: Arc<S>) -> Self
    where
        S: PermissionAdmin + 'static,
    {
        let read: Arc<dyn PermissionStore> = store.clone();
        Self {
            issuer: TokenIssuer::new(&config.auth, read.clone()),
            store: read,
            admin: store,
            default_role: config.default_role.clone(),
            session_cookie: config.session_cookie.clone(),
        }
    }

    /// Services over a fresh in-memory store.
    pub fn in_memory(config: &ApiConfig) -> Self {
        Self::new(config, Arc::new(InMemoryPermissionStore::new()))
    }
}

/// Ensures the administrator role, the default registration role and (if
/// configured) the seed administrator account exist. Safe to run repeatedly.
pub async fn seed(services: &AppServices, config: &ApiConfig) -> Result<(), AuthError> {
    let administrator = ensure_role(services, &RoleName::new(ADMINISTRATOR_ROLE)).await?;
    for claim in admin::ALL {
        if !administrator.claims.iter().any(|c| c.claim == claim) {
            services.admin.add_role_claim(administrator.id, claim).await?;
        }
    }

    ensure_role(services, &services.default_role).await?;

    let Some(seed) = &config.seed_admin else {
        return Ok(());
    };

    let user = match services.admin.find_user_by_name(&seed.username).await? {
        Some(user) => user,
        None => {
            let new_user = NewUser {
                username: seed.username.clone(),
                email: Some(seed.username.clone()),
                first_name: None,
                last_name: None,
                is_active: true,
            };
            services.admin.create_user(new_user, &seed.password).await?
        }
    };

    let role = RoleName::new(ADMINISTRATOR_ROLE);
    if !services.admin.is_user_in_role(user.id, &role).await? {
        services.admin.add_user_to_role(user.id, &role).await?;
    }

    tracing::info!(username = %user.username, "seed administrator ready");
    Ok(())
}

async fn ensure_role(services: &AppServices, name: &RoleName) -> Result<Role, AuthError> {
    if let Some(role) = services.admin.find_role_by_name(name).await? {
        return Ok(role);
    }
    match services.admin.create_role(name.clone()).await {
        Ok(role) => Ok(role),
        Err(DomainError::Conflict(_)) => services
            .admin
            .find_role_by_name(name)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("role {name}"))),
        Err(e) => Err(e.into()),
    }
}
