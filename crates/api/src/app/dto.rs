use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_auth::{Claim, ClaimId, IssuedToken, NewUser, Role, User, UserUpdate};
use warden_core::{RoleId, UserId};

use crate::app::errors::{ApiError, bad_request};

// -------------------------
// Token endpoint
// -------------------------

/// `application/x-www-form-urlencoded` body of `POST /api/Token`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub grant_type: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = ".issued")]
    pub issued: String,
    #[serde(rename = ".expires")]
    pub expires: String,
}

impl From<IssuedToken> for TokenResponse {
    fn from(token: IssuedToken) -> Self {
        Self {
            expires_in: token.expires_in(),
            issued: http_date(token.issued_at),
            expires: http_date(token.expires_at),
            access_token: token.access_token,
            token_type: "bearer",
            user_name: token.subject,
        }
    }
}

/// RFC 6749 §5.2 error body.
#[derive(Debug, Serialize)]
pub struct OAuthError {
    pub error: &'static str,
    pub error_description: String,
}

impl OAuthError {
    pub fn invalid_grant() -> Self {
        Self {
            error: "invalid_grant",
            error_description: "The user name or password is incorrect.".to_string(),
        }
    }

    pub fn unsupported_grant_type() -> Self {
        Self {
            error: "unsupported_grant_type",
            error_description: "Only the password grant is supported.".to_string(),
        }
    }

    pub fn invalid_request(description: impl Into<String>) -> Self {
        Self {
            error: "invalid_request",
            error_description: description.into(),
        }
    }
}

fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

// -------------------------
// Accounts
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl RegisterRequest {
    /// Accounts register with their email as username.
    pub fn into_new_user(self) -> Result<(NewUser, String), ApiError> {
        if self.password != self.confirm_password {
            return Err(bad_request("password and confirmation do not match"));
        }
        let email = self.email.trim().to_string();
        if email.is_empty() {
            return Err(bad_request("email is required"));
        }

        let user = NewUser {
            username: email.clone(),
            email: Some(email),
            first_name: self.first_name,
            last_name: self.last_name,
            is_active: true,
        };
        Ok((user, self.password))
    }
}

// -------------------------
// Users
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl CreateUserRequest {
    pub fn into_new_user(self) -> (NewUser, String) {
        let user = NewUser {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            is_active: self.is_active,
        };
        (user, self.password)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
}

impl From<UpdateUserRequest> for UserUpdate {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            is_active: req.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_active: user.is_active,
        }
    }
}

// -------------------------
// Roles
// -------------------------

/// Body for creating a role or assigning one to a user.
#[derive(Debug, Deserialize)]
pub struct RoleNameRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleClaimResponse {
    pub id: ClaimId,
    pub claim_type: String,
    pub claim_value: String,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: RoleId,
    pub name: String,
    pub claims: Vec<RoleClaimResponse>,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            name: role.name.to_string(),
            claims: role
                .claims
                .into_iter()
                .map(|c| RoleClaimResponse {
                    id: c.id,
                    claim_type: c.claim.claim_type().to_string(),
                    claim_value: c.claim.claim_value().to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub claim_type: String,
    pub claim_value: String,
}

impl From<ClaimRequest> for Claim {
    fn from(req: ClaimRequest) -> Self {
        Claim::new(req.claim_type, req.claim_value)
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedClaimResponse {
    pub id: ClaimId,
}

// -------------------------
// Path parsing
// -------------------------

pub fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse().map_err(|_| bad_request("invalid user id"))
}

pub fn parse_role_id(raw: &str) -> Result<RoleId, ApiError> {
    raw.parse().map_err(|_| bad_request("invalid role id"))
}
