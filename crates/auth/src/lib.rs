//! `warden-auth`: claims-based authorization core.
//!
//! Expands role memberships into effective claims, assembles scheme-tagged
//! identities, issues signed bearer tokens and gates requests on a declared
//! permission. Decoupled from HTTP; storage is reached only through the
//! [`PermissionStore`] port.

pub mod authorize;
pub mod claims;
pub mod config;
pub mod error;
pub mod expander;
pub mod identity;
pub mod issuer;
pub mod jwt;
pub mod permissions;
pub mod roles;
pub mod store;
pub mod user;

#[cfg(test)]
mod testing;

pub use authorize::{AuthorizationGate, Credential, authorize};
pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use config::{AuthConfig, DEFAULT_TOKEN_LIFETIME_DAYS};
pub use error::AuthError;
pub use expander::expand_effective_claims;
pub use identity::{Identity, Scheme, assemble_identity, build_identity};
pub use issuer::{IssuedToken, TokenIssuer};
pub use jwt::{Hs256JwtCodec, JwtSigner, JwtValidator};
pub use permissions::{Claim, ClaimSet, PERMISSION_CLAIM_TYPE, admin};
pub use roles::{ClaimId, Role, RoleClaim, RoleName};
pub use store::{NewUser, PermissionAdmin, PermissionStore, UserUpdate};
pub use user::User;
