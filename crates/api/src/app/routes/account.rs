//! Registration and browser session sign-in.

use std::sync::Arc;

use axum::{
    Extension, Form, Json, Router,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde_json::json;

use warden_auth::{Identity, PermissionAdmin, admin};

use crate::app::dto::{LoginRequest, RegisterRequest};
use crate::app::errors::{ApiError, bad_request};
use crate::app::services::AppServices;
use crate::middleware::Guard;

/// Routes mounted under `/api/v1`.
pub fn v1_router(guard: &Guard) -> Router {
    Router::new().route(
        "/account/register",
        guard.bearer(admin::CREATE_USER, post(register)),
    )
}

/// Cookie-session routes.
pub fn session_router(guard: &Guard) -> Router {
    Router::new()
        .route("/account/login", post(login))
        .route(
            "/account/claims",
            guard.cookie(admin::LIST_USER_CLAIMS, get(session_claims)),
        )
}

/// POST /api/v1/account/register - create an active account holding the default role
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(req): Json<RegisterRequest>,
) -> Result<StatusCode, ApiError> {
    let (new_user, password) = req.into_new_user()?;

    let user = services
        .admin
        .create_user(new_user, &password)
        .await
        .map_err(|e| bad_request(e.to_string()))?;

    services
        .admin
        .add_user_to_role(user.id, &services.default_role)
        .await
        .map_err(|e| bad_request(e.to_string()))?;

    tracing::info!(username = %user.username, role = %services.default_role, "account registered");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /account/login - sign in and receive a session cookie
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Form(req): Form<LoginRequest>,
) -> Result<Response, ApiError> {
    let session = services
        .issuer
        .issue_session(&req.username, &req.password, Utc::now())
        .await?;

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        services.session_cookie,
        session.access_token,
        session.expires_in()
    );
    let cookie = HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError(warden_auth::AuthError::Internal(e.to_string())))?;

    let body = Json(json!({
        "userName": session.subject,
        "expires": session.expires_at.to_rfc3339(),
    }));

    let mut response = (StatusCode::OK, body).into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

/// GET /account/claims - claims of the signed-in session
pub async fn session_claims(Extension(identity): Extension<Identity>) -> impl IntoResponse {
    Json(json!({
        "userName": identity.subject,
        "claims": identity.claims,
    }))
}
