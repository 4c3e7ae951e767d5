//! `POST /api/Token`: resource-owner password credentials grant.

use std::sync::Arc;

use axum::{
    Extension, Form, Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use warden_auth::AuthError;

use crate::app::dto::{OAuthError, TokenRequest, TokenResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub async fn issue(
    Extension(services): Extension<Arc<AppServices>>,
    Form(req): Form<TokenRequest>,
) -> Response {
    match req.grant_type.as_deref() {
        Some("password") => {}
        Some(_) => return oauth_error(OAuthError::unsupported_grant_type()),
        None => return oauth_error(OAuthError::invalid_request("grant_type is required")),
    }

    let (Some(username), Some(password)) = (req.username, req.password) else {
        return oauth_error(OAuthError::invalid_request(
            "username and password are required",
        ));
    };

    match services
        .issuer
        .issue_token(&username, &password, Utc::now())
        .await
    {
        Ok(token) => {
            tracing::info!(user = %token.subject, "bearer token issued");
            Json(TokenResponse::from(token)).into_response()
        }
        Err(AuthError::AuthenticationFailed) => {
            tracing::info!("token request rejected");
            oauth_error(OAuthError::invalid_grant())
        }
        Err(e) => ApiError(e).into_response(),
    }
}

fn oauth_error(body: OAuthError) -> Response {
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}
