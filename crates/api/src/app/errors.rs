use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use warden_auth::AuthError;

/// Maps core failures onto HTTP statuses.
///
/// `AuthenticationFailed` and `Unauthorized` never carry a sub-reason.
#[derive(Debug)]
pub struct ApiError(pub AuthError);

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        Self(value)
    }
}

impl From<warden_core::DomainError> for ApiError {
    fn from(value: warden_core::DomainError) -> Self {
        Self(value.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            AuthError::NotFound(what) => json_error(StatusCode::NOT_FOUND, "not_found", what),
            AuthError::AuthenticationFailed | AuthError::Unauthorized => {
                json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
            }
            AuthError::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, "bad_request", msg),
            AuthError::Store(e) => {
                tracing::error!(error = %e, "permission store failure");
                json_error(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "store_unavailable",
                    "permission store unavailable",
                )
            }
            AuthError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error",
                )
            }
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn bad_request(message: impl Into<String>) -> ApiError {
    ApiError(AuthError::BadRequest(message.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_and_authorization_failures_share_a_status() {
        let a = ApiError(AuthError::AuthenticationFailed).into_response();
        let b = ApiError(AuthError::Unauthorized).into_response();
        assert_eq!(a.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(b.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn not_found_and_bad_request_statuses() {
        let nf = ApiError(AuthError::NotFound("role".into())).into_response();
        let br = ApiError(AuthError::BadRequest("dup".into())).into_response();
        assert_eq!(nf.status(), StatusCode::NOT_FOUND);
        assert_eq!(br.status(), StatusCode::BAD_REQUEST);
    }
}
