use chrono::Duration;

/// Default bearer token lifetime.
pub const DEFAULT_TOKEN_LIFETIME_DAYS: i64 = 14;

/// Configuration handed to the token issuer and the authorization gate at
/// construction.
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret shared by issuer and gate.
    pub signing_secret: Vec<u8>,
    pub token_lifetime: Duration,
    /// Account whose claims back machine-to-machine client identities.
    pub system_account: Option<String>,
    /// Client ids allowed to act as the system account.
    pub clients: Vec<String>,
}

impl AuthConfig {
    pub fn new(signing_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            token_lifetime: Duration::days(DEFAULT_TOKEN_LIFETIME_DAYS),
            system_account: None,
            clients: Vec::new(),
        }
    }

    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    pub fn with_system_account(mut self, username: impl Into<String>) -> Self {
        self.system_account = Some(username.into());
        self
    }

    pub fn with_client(mut self, client_id: impl Into<String>) -> Self {
        self.clients.push(client_id.into());
        self
    }
}

impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_secret", &"<redacted>")
            .field("token_lifetime", &self.token_lifetime)
            .field("system_account", &self.system_account)
            .field("clients", &self.clients)
            .finish()
    }
}
