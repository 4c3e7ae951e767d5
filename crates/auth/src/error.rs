use thiserror::Error;

use warden_core::DomainError;

/// Failure taxonomy of the authorization core.
///
/// `AuthenticationFailed` and `Unauthorized` carry no detail on purpose: the
/// caller must not be able to tell an unknown account from a wrong password,
/// or a missing token from a missing permission.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("unauthorized")]
    Unauthorized,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("permission store failure: {0}")]
    Store(DomainError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AuthError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::NotFound(what) => AuthError::NotFound(what),
            DomainError::Validation(msg)
            | DomainError::InvalidId(msg)
            | DomainError::Conflict(msg) => AuthError::BadRequest(msg),
            e @ DomainError::Unavailable(_) => AuthError::Store(e),
        }
    }
}
