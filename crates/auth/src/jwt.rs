//! HS256 JWT encoding/decoding of [`TokenClaims`].

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::{TokenClaims, TokenValidationError, validate_claims};

/// Decodes and validates a presented token.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenValidationError>;
}

/// Produces signed tokens.
pub trait JwtSigner: Send + Sync {
    fn sign(&self, claims: &TokenClaims) -> Result<String, TokenValidationError>;
}

/// Symmetric HS256 codec.
///
/// Signature checking is delegated to `jsonwebtoken`; the time window is
/// checked by [`validate_claims`] against the caller's clock.
#[derive(Clone)]
pub struct Hs256JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256JwtCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl core::fmt::Debug for Hs256JwtCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256JwtCodec").finish_non_exhaustive()
    }
}

impl JwtSigner for Hs256JwtCodec {
    fn sign(&self, claims: &TokenClaims) -> Result<String, TokenValidationError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenValidationError::Encoding(e.to_string()))
    }
}

impl JwtValidator for Hs256JwtCodec {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenValidationError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}
