//! `warden-core`: identifiers and the store-level error model shared by every crate.
//!
//! Nothing here performs IO.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{RoleId, UserId};
