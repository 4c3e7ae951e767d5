use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use warden_core::UserId;

use crate::{Claim, ClaimSet, Identity, Scheme};

/// Signed token payload (transport-agnostic).
///
/// Timestamps are Unix seconds so the payload stays a conventional JWT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: username of the authenticated account.
    pub sub: String,

    /// Stable account identifier.
    pub uid: UserId,

    /// Channel the identity was minted for.
    pub scheme: Scheme,

    /// Effective claims at issuance, sorted by type then value.
    pub claims: Vec<Claim>,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

impl TokenClaims {
    /// Fails with `InvalidTimeWindow` when `issued_at + lifetime` leaves the
    /// representable calendar.
    pub fn for_identity(
        identity: &Identity,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, TokenValidationError> {
        let expires_at = issued_at
            .checked_add_signed(lifetime)
            .ok_or(TokenValidationError::InvalidTimeWindow)?;

        Ok(Self {
            sub: identity.subject.clone(),
            uid: identity.user_id,
            scheme: identity.scheme,
            claims: identity.claims.iter().cloned().collect(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.iat, 0).single()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    pub fn into_identity(self) -> Identity {
        Identity {
            scheme: self.scheme,
            user_id: self.uid,
            subject: self.sub,
            claims: self.claims.into_iter().collect::<ClaimSet>(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Deterministically validate the token time window against `now`.
///
/// There is no leeway: a token is expired from the second `exp` is reached.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin;

    fn claims_at(iat: i64, exp: i64) -> TokenClaims {
        TokenClaims {
            sub: "alice".to_string(),
            uid: UserId::new(),
            scheme: Scheme::Bearer,
            claims: vec![admin::VIEW_ROLE],
            iat,
            exp,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn window_boundaries() {
        let c = claims_at(1_000, 2_000);
        assert_eq!(validate_claims(&c, at(999)), Err(TokenValidationError::NotYetValid));
        assert_eq!(validate_claims(&c, at(1_000)), Ok(()));
        assert_eq!(validate_claims(&c, at(1_999)), Ok(()));
        assert_eq!(validate_claims(&c, at(2_000)), Err(TokenValidationError::Expired));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let c = claims_at(2_000, 2_000);
        assert_eq!(
            validate_claims(&c, at(2_000)),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn identity_survives_payload_conversion() {
        let identity = Identity {
            scheme: Scheme::Cookie,
            user_id: UserId::new(),
            subject: "bob".to_string(),
            claims: [admin::LIST_USERS, admin::VIEW_USER].into_iter().collect(),
        };
        let payload = TokenClaims::for_identity(&identity, at(10), Duration::days(14)).unwrap();
        assert_eq!(payload.exp - payload.iat, 14 * 24 * 60 * 60);
        assert_eq!(payload.into_identity(), identity);
    }

    #[test]
    fn lifetime_past_the_calendar_is_an_invalid_window() {
        let identity = Identity {
            scheme: Scheme::Bearer,
            user_id: UserId::new(),
            subject: "carol".to_string(),
            claims: ClaimSet::new(),
        };
        let huge = Duration::seconds(10_000_000_000_000);

        assert_eq!(
            TokenClaims::for_identity(&identity, Utc::now(), huge),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }
}
