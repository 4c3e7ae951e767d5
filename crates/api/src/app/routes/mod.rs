use axum::{Router, routing::post};

use crate::middleware::Guard;

pub mod account;
pub mod roles;
pub mod system;
pub mod token;
pub mod users;

/// Every route except `/health`.
pub fn router(guard: &Guard) -> Router {
    let v1 = Router::new()
        .merge(account::v1_router(guard))
        .merge(roles::router(guard))
        .merge(users::router(guard));

    Router::new()
        .route("/api/Token", post(token::issue))
        .merge(account::session_router(guard))
        .nest("/api/v1", v1)
}
