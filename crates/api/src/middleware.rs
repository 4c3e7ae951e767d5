use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{Next, from_fn_with_state},
    response::Response,
    routing::MethodRouter,
};
use chrono::Utc;

use warden_auth::{AuthorizationGate, Claim, Credential, Scheme};

use crate::app::errors;

/// Per-route gate configuration: which channel to read and what to require.
#[derive(Clone)]
pub struct GateState {
    pub gate: AuthorizationGate,
    pub channel: Scheme,
    pub required: Claim,
    pub session_cookie: Arc<str>,
}

/// Attaches a declared permission to individual routes.
#[derive(Clone)]
pub struct Guard {
    gate: AuthorizationGate,
    session_cookie: Arc<str>,
}

impl Guard {
    pub fn new(gate: AuthorizationGate, session_cookie: impl Into<Arc<str>>) -> Self {
        Self {
            gate,
            session_cookie: session_cookie.into(),
        }
    }

    /// Require `required` on a bearer token from the `Authorization` header.
    pub fn bearer(&self, required: Claim, route: MethodRouter) -> MethodRouter {
        self.layer(Scheme::Bearer, required, route)
    }

    /// Require `required` on a session token from the session cookie.
    pub fn cookie(&self, required: Claim, route: MethodRouter) -> MethodRouter {
        self.layer(Scheme::Cookie, required, route)
    }

    fn layer(&self, channel: Scheme, required: Claim, route: MethodRouter) -> MethodRouter {
        let state = GateState {
            gate: self.gate.clone(),
            channel,
            required,
            session_cookie: self.session_cookie.clone(),
        };
        route.route_layer(from_fn_with_state(state, gate_middleware))
    }
}

/// Runs the authorization gate before the handler.
///
/// On success the decoded `Identity` is placed in request extensions. Every
/// failure is the same bare 401.
pub async fn gate_middleware(
    State(state): State<GateState>,
    mut req: Request,
    next: Next,
) -> Response {
    let credential = match state.channel {
        Scheme::Bearer => extract_bearer(req.headers()).map(Credential::bearer),
        Scheme::Cookie => {
            extract_cookie(req.headers(), &state.session_cookie).map(Credential::cookie)
        }
    };

    match state.gate.check(credential, &state.required, Utc::now()) {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(_) => {
            tracing::warn!(
                path = %req.uri().path(),
                channel = %state.channel,
                required = %state.required,
                "request denied"
            );
            errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
        }
    }
}

pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        return None;
    }

    Some(token)
}

pub fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
