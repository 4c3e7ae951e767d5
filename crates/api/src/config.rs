//! Process configuration loaded from the environment.

use std::env;

use chrono::Duration;
use thiserror::Error;

use warden_auth::{AuthConfig, RoleName};

/// Role granted to self-registered accounts when `WARDEN_DEFAULT_ROLE` is unset.
pub const DEFAULT_REGISTRATION_ROLE: &str = "Basic";

/// Cookie carrying the session token issued by `/account/login`.
pub const DEFAULT_SESSION_COOKIE: &str = "warden_session";

/// Longest accepted `WARDEN_TOKEN_LIFETIME_SECS` (ten years).
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 10 * 365 * 24 * 60 * 60;

const DEV_SECRET: &str = "dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Credentials of the administrator account seeded at startup.
#[derive(Clone)]
pub struct SeedAdmin {
    pub username: String,
    pub password: String,
}

impl core::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub auth: AuthConfig,
    pub default_role: RoleName,
    pub session_cookie: String,
    pub seed_admin: Option<SeedAdmin>,
}

impl ApiConfig {
    /// Configuration for an in-process server (tests, embedding).
    pub fn new(auth: AuthConfig) -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            auth,
            default_role: RoleName::new(DEFAULT_REGISTRATION_ROLE),
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            seed_admin: None,
        }
    }

    pub fn with_seed_admin(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.seed_admin = Some(SeedAdmin {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from `lookup`, which maps a variable name to
    /// its value. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let secret = lookup("WARDEN_JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("WARDEN_JWT_SECRET not set; using insecure dev default");
            DEV_SECRET.to_string()
        });

        let mut auth = AuthConfig::new(secret);

        if let Some(raw) = var("WARDEN_TOKEN_LIFETIME_SECS") {
            auth = auth.with_token_lifetime(parse_lifetime(&raw)?);
        }

        if let Some(account) = var("WARDEN_SYSTEM_ACCOUNT") {
            auth = auth.with_system_account(account);
        }

        if let Some(clients) = var("WARDEN_CLIENTS") {
            for client in clients.split(',').map(str::trim).filter(|c| !c.is_empty()) {
                auth = auth.with_client(client);
            }
        }

        let mut config = Self::new(auth);

        if let Some(addr) = var("WARDEN_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(role) = var("WARDEN_DEFAULT_ROLE") {
            config.default_role = RoleName::new(role);
        }
        if let Some(cookie) = var("WARDEN_SESSION_COOKIE") {
            config.session_cookie = cookie;
        }

        match (
            var("WARDEN_SEED_ADMIN_USERNAME"),
            var("WARDEN_SEED_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => config = config.with_seed_admin(username, password),
            (None, None) => {}
            _ => {
                return Err(ConfigError::Invalid {
                    name: "WARDEN_SEED_ADMIN_USERNAME",
                    reason: "seed admin username and password must be set together".to_string(),
                });
            }
        }

        Ok(config)
    }
}

fn parse_lifetime(raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|secs| (1..=MAX_TOKEN_LIFETIME_SECS).contains(secs))
        .and_then(Duration::try_seconds)
        .ok_or_else(|| ConfigError::Invalid {
            name: "WARDEN_TOKEN_LIFETIME_SECS",
            reason: format!(
                "expected between 1 and {MAX_TOKEN_LIFETIME_SECS} seconds, got {raw:?}"
            ),
        })
}
