//! Resource-owner password credentials grant.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::{
    AuthConfig, AuthError, Hs256JwtCodec, Identity, JwtSigner, PermissionStore, Scheme, TokenClaims,
    User, assemble_identity, build_identity, expand_effective_claims,
};

/// A freshly signed token and its validity window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub scheme: Scheme,
    /// Username the token was issued to.
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Remaining lifetime in whole seconds at issuance.
    pub fn expires_in(&self) -> i64 {
        (self.expires_at - self.issued_at).num_seconds()
    }
}

/// Authenticates accounts and mints signed, time-bounded identities.
#[derive(Clone)]
pub struct TokenIssuer {
    store: Arc<dyn PermissionStore>,
    signer: Arc<dyn JwtSigner>,
    lifetime: Duration,
    system_account: Option<String>,
    clients: Vec<String>,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig, store: Arc<dyn PermissionStore>) -> Self {
        Self {
            store,
            signer: Arc::new(Hs256JwtCodec::new(&config.signing_secret)),
            lifetime: config.token_lifetime,
            system_account: config.system_account.clone(),
            clients: config.clients.clone(),
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a bearer token for `username`/`password`.
    ///
    /// Unknown account, wrong password, disabled or soft-deleted account all
    /// yield the same [`AuthError::AuthenticationFailed`].
    pub async fn issue_token(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        self.issue(username, password, Scheme::Bearer, now).await
    }

    /// Same checks as [`issue_token`](Self::issue_token), minting a
    /// cookie-scoped identity for browser sessions.
    pub async fn issue_session(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        self.issue(username, password, Scheme::Cookie, now).await
    }

    /// Identity of the configured system account.
    pub async fn system_identity(&self) -> Result<Identity, AuthError> {
        let username = self
            .system_account
            .as_deref()
            .ok_or_else(|| AuthError::NotFound("system account is not configured".to_string()))?;

        assemble_identity(self.store.as_ref(), username, Scheme::Bearer).await
    }

    /// Identity for a machine-to-machine client, backed by the system account.
    pub async fn client_identity(&self, client_id: &str) -> Result<Identity, AuthError> {
        if !self.clients.iter().any(|c| c == client_id) {
            return Err(AuthError::Unauthorized);
        }
        self.system_identity().await
    }

    async fn issue(
        &self,
        username: &str,
        password: &str,
        scheme: Scheme,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let user = self.authenticate(username, password).await?;
        let claims = expand_effective_claims(self.store.as_ref(), user.id).await?;
        let identity = build_identity(&user, claims, scheme);

        let expires_at = now
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| AuthError::Internal("token lifetime overflows the clock".to_string()))?;
        let payload = TokenClaims::for_identity(&identity, now, self.lifetime)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        let access_token = self
            .signer
            .sign(&payload)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(IssuedToken {
            access_token,
            scheme,
            subject: identity.subject,
            issued_at: now,
            expires_at,
        })
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        // Always verify, even for unknown accounts, so every failure costs the same.
        let verified = self.store.verify_credential(username, password).await?;
        let user = self.store.find_user_by_name(username).await?;

        match user {
            Some(user) if verified && user.can_authenticate() => Ok(user),
            _ => Err(AuthError::AuthenticationFailed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticStore;
    use crate::{AuthorizationGate, Credential, JwtValidator, admin};
    use warden_core::DomainError;

    fn config() -> AuthConfig {
        AuthConfig::new("issuer-secret")
    }

    fn admin_store() -> StaticStore {
        StaticStore::new()
            .with_role("Administrator", [admin::ASSIGN_ROLE, admin::CREATE_CLAIM])
            .with_role("Basic", [])
            .with_user("admin@admin.com", "Hello123!", &["Administrator"])
            .with_user("basic@example.com", "pw", &["Basic"])
    }

    #[tokio::test]
    async fn issued_token_round_trips_to_the_expanded_claims() {
        let store = Arc::new(admin_store());
        let issuer = TokenIssuer::new(&config(), store.clone());
        let now = Utc::now();

        let token = issuer
            .issue_token("admin@admin.com", "Hello123!", now)
            .await
            .unwrap();

        let expected = expand_effective_claims(store.as_ref(), store.user_id("admin@admin.com"))
            .await
            .unwrap();
        let decoded = Hs256JwtCodec::new(b"issuer-secret")
            .validate(&token.access_token, now)
            .unwrap()
            .into_identity();

        assert_eq!(decoded.claims, expected);
        assert_eq!(decoded.scheme, Scheme::Bearer);
        assert_eq!(decoded.subject, "admin@admin.com");
        assert_eq!(token.expires_in(), 14 * 24 * 60 * 60);
    }

    #[tokio::test]
    async fn username_lookup_is_case_insensitive() {
        let issuer = TokenIssuer::new(&config(), Arc::new(admin_store()));
        let token = issuer
            .issue_token("ADMIN@Admin.com", "Hello123!", Utc::now())
            .await
            .unwrap();
        assert_eq!(token.subject, "admin@admin.com");
    }

    #[tokio::test]
    async fn every_credential_failure_looks_the_same() {
        let store = admin_store()
            .with_user("gone@example.com", "pw", &["Basic"])
            .soft_delete("gone@example.com")
            .with_user("off@example.com", "pw", &["Basic"])
            .deactivate("off@example.com");
        let issuer = TokenIssuer::new(&config(), Arc::new(store));
        let now = Utc::now();

        for (username, password) in [
            ("nobody@example.com", "pw"),
            ("admin@admin.com", "wrong"),
            ("gone@example.com", "pw"),
            ("off@example.com", "pw"),
        ] {
            let err = issuer.issue_token(username, password, now).await.unwrap_err();
            assert_eq!(err, AuthError::AuthenticationFailed, "{username}");
        }
    }

    #[tokio::test]
    async fn store_outage_is_not_reported_as_bad_credentials() {
        let store = admin_store().failing_claims(DomainError::unavailable("db down"));
        let issuer = TokenIssuer::new(&config(), Arc::new(store));

        let err = issuer
            .issue_token("admin@admin.com", "Hello123!", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));
    }

    #[tokio::test]
    async fn lifetime_comes_from_configuration() {
        let cfg = config().with_token_lifetime(Duration::minutes(5));
        let issuer = TokenIssuer::new(&cfg, Arc::new(admin_store()));

        let token = issuer
            .issue_token("basic@example.com", "pw", Utc::now())
            .await
            .unwrap();
        assert_eq!(token.expires_in(), 300);
    }

    #[tokio::test]
    async fn unrepresentable_lifetime_is_an_internal_error() {
        let cfg = config().with_token_lifetime(Duration::seconds(10_000_000_000_000));
        let issuer = TokenIssuer::new(&cfg, Arc::new(admin_store()));

        let err = issuer
            .issue_token("basic@example.com", "pw", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));

        let err = issuer
            .issue_session("basic@example.com", "pw", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
    }

    #[tokio::test]
    async fn session_tokens_are_cookie_scoped() {
        let cfg = config();
        let issuer = TokenIssuer::new(&cfg, Arc::new(admin_store()));
        let gate = AuthorizationGate::new(&cfg);
        let now = Utc::now();

        let session = issuer
            .issue_session("admin@admin.com", "Hello123!", now)
            .await
            .unwrap();
        assert_eq!(session.scheme, Scheme::Cookie);

        let as_cookie = Credential::cookie(&session.access_token);
        assert!(gate.check(Some(as_cookie), &admin::ASSIGN_ROLE, now).is_ok());

        let as_bearer = Credential::bearer(&session.access_token);
        assert_eq!(
            gate.check(Some(as_bearer), &admin::ASSIGN_ROLE, now),
            Err(AuthError::Unauthorized)
        );
    }

    #[tokio::test]
    async fn system_identity_uses_the_configured_account() {
        let cfg = config()
            .with_system_account("admin@admin.com")
            .with_client("client-1");
        let issuer = TokenIssuer::new(&cfg, Arc::new(admin_store()));

        let identity = issuer.client_identity("client-1").await.unwrap();
        assert!(identity.has_claim(&admin::CREATE_CLAIM));
        assert_eq!(identity.scheme, Scheme::Bearer);

        assert_eq!(
            issuer.client_identity("client-2").await.unwrap_err(),
            AuthError::Unauthorized
        );
    }

    #[tokio::test]
    async fn missing_system_account_never_yields_an_empty_identity() {
        let cfg = config()
            .with_system_account("service@example.com")
            .with_client("client-1");
        let issuer = TokenIssuer::new(&cfg, Arc::new(admin_store()));

        let err = issuer.client_identity("client-1").await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound(_)));

        let unconfigured = TokenIssuer::new(&config(), Arc::new(admin_store()));
        assert!(matches!(
            unconfigured.system_identity().await,
            Err(AuthError::NotFound(_))
        ));
    }
}
