//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, issuer and seed data
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use warden_auth::AuthorizationGate;

use crate::config::ApiConfig;
use crate::middleware::Guard;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Each protected route carries its own gate layer; nothing outside
/// `/health`, `/api/Token` and `/account/login` is reachable without one.
pub fn build_app(config: &ApiConfig, services: Arc<services::AppServices>) -> Router {
    let guard = Guard::new(
        AuthorizationGate::new(&config.auth),
        config.session_cookie.as_str(),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router(&guard))
        .layer(Extension(services))
        .layer(ServiceBuilder::new())
}
