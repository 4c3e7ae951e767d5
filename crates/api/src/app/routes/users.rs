//! Account administration and user role membership.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{delete, get, post, put},
};

use warden_auth::{
    AuthError, ClaimSet, PermissionAdmin, PermissionStore, RoleName, User, admin,
    expand_effective_claims,
};
use warden_core::UserId;

use crate::app::dto::{
    CreateUserRequest, RoleNameRequest, RoleResponse, UpdateUserRequest, UserResponse,
    parse_user_id,
};
use crate::app::errors::{ApiError, bad_request};
use crate::app::routes::roles::find_role;
use crate::app::services::AppServices;
use crate::middleware::Guard;

pub fn router(guard: &Guard) -> Router {
    Router::new()
        .route("/users", guard.bearer(admin::LIST_USERS, get(list_users)))
        .route("/users", guard.bearer(admin::CREATE_USER, post(create_user)))
        .route("/users/:user_id", guard.bearer(admin::VIEW_USER, get(get_user)))
        .route(
            "/users/:user_id",
            guard.bearer(admin::UPDATE_USER, put(update_user)),
        )
        .route(
            "/users/:user_id",
            guard.bearer(admin::DELETE_USER, delete(delete_user)),
        )
        .route(
            "/users/:user_id/claims",
            guard.bearer(admin::LIST_USER_CLAIMS, get(user_claims)),
        )
        .route(
            "/users/:user_id/roles",
            guard.bearer(admin::LIST_ROLES, get(user_roles)),
        )
        .route(
            "/users/:user_id/roles",
            guard.bearer(admin::ASSIGN_ROLE, post(assign_role)),
        )
        .route(
            "/users/:user_id/roles/:role_id",
            guard.bearer(admin::VIEW_ROLE, get(user_role)),
        )
        .route(
            "/users/:user_id/roles/:role_id",
            guard.bearer(admin::REVOKE_ROLE, delete(remove_role)),
        )
}

/// GET /api/v1/users - accounts that are not soft-deleted
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = services.admin.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// POST /api/v1/users
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let (new_user, password) = req.into_new_user();
    let user = services.admin.create_user(new_user, &password).await?;
    tracing::info!(username = %user.username, "user created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /api/v1/users/:user_id
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = find_user(&services, &user_id).await?;
    Ok(Json(user.into()))
}

/// PUT /api/v1/users/:user_id
pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let user = services.admin.update_user(user_id, req.into()).await?;
    Ok(Json(user.into()))
}

/// DELETE /api/v1/users/:user_id - soft delete; the account can no longer sign in
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let user = find_user(&services, &user_id).await?;
    services.admin.soft_delete_user(user.id).await?;
    tracing::info!(username = %user.username, "user soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/users/:user_id/claims - effective claims, recomputed on every call
pub async fn user_claims(
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
) -> Result<Json<ClaimSet>, ApiError> {
    let user = find_user(&services, &user_id).await?;
    let claims = expand_effective_claims(services.store.as_ref(), user.id).await?;
    Ok(Json(claims))
}

/// GET /api/v1/users/:user_id/roles
pub async fn user_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<RoleResponse>>, ApiError> {
    let user = find_user(&services, &user_id).await?;

    let mut roles = Vec::new();
    for name in services.store.roles_for_user(user.id).await? {
        if let Some(role) = services.admin.find_role_by_name(&name).await? {
            roles.push(RoleResponse::from(role));
        }
    }
    Ok(Json(roles))
}

/// POST /api/v1/users/:user_id/roles - any failure to assign is a bad request
pub async fn assign_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
    Json(req): Json<RoleNameRequest>,
) -> Result<(StatusCode, Json<RoleResponse>), ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let name = RoleName::new(req.name);

    let role = services
        .admin
        .find_role_by_name(&name)
        .await?
        .ok_or_else(|| bad_request(format!("role {name} does not exist")))?;

    services
        .admin
        .add_user_to_role(user_id, &role.name)
        .await
        .map_err(|e| bad_request(e.to_string()))?;

    tracing::info!(%user_id, role = %role.name, "role assigned");
    Ok((StatusCode::CREATED, Json(role.into())))
}

/// GET /api/v1/users/:user_id/roles/:role_id
///
/// Unknown role is 404; a role the user does not hold is 401.
pub async fn user_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path((user_id, role_id)): Path<(String, String)>,
) -> Result<Json<RoleResponse>, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let role = find_role(&services, &role_id).await?;

    if !services.store.is_user_in_role(user_id, &role.name).await? {
        return Err(ApiError(AuthError::Unauthorized));
    }
    Ok(Json(role.into()))
}

/// DELETE /api/v1/users/:user_id/roles/:role_id
pub async fn remove_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path((user_id, role_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let role = find_role(&services, &role_id).await?;

    services
        .admin
        .remove_user_from_role(user_id, &role.name)
        .await
        .map_err(|e| bad_request(e.to_string()))?;

    tracing::info!(%user_id, role = %role.name, "role revoked");
    Ok(StatusCode::NO_CONTENT)
}

/// Looks up a live account; soft-deleted accounts read as missing.
async fn find_user(services: &AppServices, raw_id: &str) -> Result<User, ApiError> {
    let user_id: UserId = parse_user_id(raw_id)?;
    services
        .store
        .find_user_by_id(user_id)
        .await?
        .filter(|user| !user.deleted)
        .ok_or_else(|| ApiError(AuthError::NotFound(format!("user {user_id}"))))
}
