//! Role and role-claim administration.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::Path,
    http::StatusCode,
    routing::{delete, get, post},
};

use warden_auth::{ClaimId, PermissionAdmin, PermissionStore, Role, RoleName, admin};

use crate::app::dto::{
    ClaimRequest, CreatedClaimResponse, RoleNameRequest, RoleResponse, parse_role_id,
};
use crate::app::errors::{ApiError, bad_request};
use crate::app::services::AppServices;
use crate::middleware::Guard;

pub fn router(guard: &Guard) -> Router {
    Router::new()
        .route("/roles", guard.bearer(admin::LIST_ROLES, get(list_roles)))
        .route("/roles", guard.bearer(admin::CREATE_ROLE, post(create_role)))
        .route("/roles/:role_id", guard.bearer(admin::VIEW_ROLE, get(get_role)))
        .route(
            "/roles/:role_id",
            guard.bearer(admin::DELETE_ROLE, delete(delete_role)),
        )
        .route(
            "/roles/:role_id/claims",
            guard.bearer(admin::LIST_ROLE_CLAIMS, get(list_role_claims)),
        )
        .route(
            "/roles/:role_id/claims",
            guard.bearer(admin::CREATE_CLAIM, post(add_claim)),
        )
        .route(
            "/roles/:role_id/claims/:claim_id",
            guard.bearer(admin::DELETE_ROLE_CLAIM, delete(remove_claim)),
        )
}

/// GET /api/v1/roles
pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<RoleResponse>>, ApiError> {
    let roles = services.admin.list_roles().await?;
    Ok(Json(roles.into_iter().map(RoleResponse::from).collect()))
}

/// POST /api/v1/roles
pub async fn create_role(
    Extension(services): Extension<Arc<AppServices>>,
    Json(req): Json<RoleNameRequest>,
) -> Result<(StatusCode, Json<RoleResponse>), ApiError> {
    let role = services.admin.create_role(RoleName::new(req.name)).await?;
    tracing::info!(role = %role.name, "role created");
    Ok((StatusCode::CREATED, Json(role.into())))
}

/// GET /api/v1/roles/:role_id
pub async fn get_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path(role_id): Path<String>,
) -> Result<Json<RoleResponse>, ApiError> {
    let role = find_role(&services, &role_id).await?;
    Ok(Json(role.into()))
}

/// DELETE /api/v1/roles/:role_id - cascades to the role's claims and memberships
///
/// Any failure to delete, an unknown role included, is a bad request.
pub async fn delete_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path(role_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let role_id = parse_role_id(&role_id)?;
    services
        .admin
        .delete_role(role_id)
        .await
        .map_err(|e| bad_request(e.to_string()))?;
    tracing::info!(%role_id, "role deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/roles/:role_id/claims
pub async fn list_role_claims(
    Extension(services): Extension<Arc<AppServices>>,
    Path(role_id): Path<String>,
) -> Result<Json<Vec<warden_auth::Claim>>, ApiError> {
    let role = find_role(&services, &role_id).await?;
    let claims = services.store.claims_for_role(&role.name).await?;
    Ok(Json(claims))
}

/// POST /api/v1/roles/:role_id/claims
pub async fn add_claim(
    Extension(services): Extension<Arc<AppServices>>,
    Path(role_id): Path<String>,
    Json(req): Json<ClaimRequest>,
) -> Result<(StatusCode, Json<CreatedClaimResponse>), ApiError> {
    let role_id = parse_role_id(&role_id)?;
    let id = services.admin.add_role_claim(role_id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(CreatedClaimResponse { id })))
}

/// DELETE /api/v1/roles/:role_id/claims/:claim_id
pub async fn remove_claim(
    Extension(services): Extension<Arc<AppServices>>,
    Path((role_id, claim_id)): Path<(String, ClaimId)>,
) -> Result<StatusCode, ApiError> {
    let role_id = parse_role_id(&role_id)?;
    services.admin.remove_role_claim(role_id, claim_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn find_role(services: &AppServices, raw_id: &str) -> Result<Role, ApiError> {
    let role_id = parse_role_id(raw_id)?;
    services
        .admin
        .find_role_by_id(role_id)
        .await?
        .ok_or_else(|| ApiError(warden_auth::AuthError::NotFound(format!("role {role_id}"))))
}
