//! Infrastructure layer: permission store adapters and credential hashing.

pub mod password;
pub mod permission_store;

pub use password::{Argon2PasswordHasher, PasswordHasher};
pub use permission_store::InMemoryPermissionStore;
