//! HTTP API: token endpoint, account and administration routes, request gating.

pub mod app;
pub mod config;
pub mod middleware;
