//! # Federated Credential Exchange
//!
//! Turns a [`Session`] into temporary storage credentials by presenting the
//! ID token to an identity pool under the provider's login name.
//!
//! ## Exchange Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Federated Credential Exchange                        │
//! │                                                                         │
//! │  Session ──► iss must name the configured authority                    │
//! │              aud must contain the configured client_id                 │
//! │                   │                                                     │
//! │  logins = { "{authority host}/{path}": id_token }                      │
//! │                   │                                                     │
//! │                   ▼                                                     │
//! │         identity pool (identity_pool_id, region)                       │
//! │                   │                                                     │
//! │                   ▼                                                     │
//! │  StorageCredentials { identity_id, keys, session_token, expires_at }   │
//! │                                                                         │
//! │  Expired credentials are never refreshed silently: the storage client  │
//! │  fails with CredentialsExpired and the user signs in again.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::StockbookConfig;
use crate::error::{AuthError, AuthResult};
use crate::oidc::provider_login_name;
use crate::session::Session;

/// Lifetime of locally issued credentials.
const LOCAL_CREDENTIAL_LIFETIME_SECS: i64 = 3600;

// =============================================================================
// Credentials
// =============================================================================

/// Temporary credentials scoped to the document store.
#[derive(Clone, PartialEq)]
pub struct StorageCredentials {
    pub identity_id: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub region: String,
    pub expires_at: DateTime<Utc>,
}

impl StorageCredentials {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Seconds of validity left, zero once expired.
    pub fn remaining_secs(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }

    /// Returns an error once the credentials are past expiry.
    pub fn ensure_valid(&self) -> AuthResult<()> {
        if self.is_expired() {
            warn!(identity_id = %self.identity_id, "Storage credentials expired");
            return Err(AuthError::CredentialsExpired);
        }
        Ok(())
    }
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("identity_id", &self.identity_id)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .field("region", &self.region)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

// =============================================================================
// Exchange Contract
// =============================================================================

/// Exchanges a signed-in session for storage credentials.
pub trait CredentialExchange: Send + Sync {
    fn exchange(
        &self,
        session: &Session,
    ) -> impl Future<Output = AuthResult<StorageCredentials>> + Send;
}

// =============================================================================
// Local Identity Pool
// =============================================================================

/// Identity pool for the bundled SQLite store.
///
/// Accepts an unexpired session whose token was issued by the configured
/// authority for the configured client, and derives a stable identity id
/// from the subject. Without a configured authority no token is accepted.
#[derive(Debug, Clone)]
pub struct LocalIdentityPool {
    identity_pool_id: String,
    region: String,
    provider: Option<String>,
    client_id: String,
    lifetime: Duration,
}

impl LocalIdentityPool {
    pub fn new(config: &StockbookConfig) -> AuthResult<Self> {
        let provider = if config.identity.authority.is_empty() {
            None
        } else {
            Some(provider_login_name(&config.identity.authority)?)
        };
        Ok(LocalIdentityPool {
            identity_pool_id: config.storage.identity_pool_id.clone(),
            region: config.storage.region.clone(),
            provider,
            client_id: config.identity.client_id.clone(),
            lifetime: Duration::seconds(LOCAL_CREDENTIAL_LIFETIME_SECS),
        })
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Login map presented to the pool for a session, keyed by the
    /// provider named in the token's `iss` claim.
    pub fn logins(&self, session: &Session) -> AuthResult<HashMap<String, String>> {
        let provider = provider_login_name(session.issuer())
            .map_err(|_| AuthError::ExchangeFailed(format!("unusable token issuer: {:?}", session.issuer())))?;
        Ok(HashMap::from([(provider, session.id_token().to_string())]))
    }

    /// Refuses a login map that does not name the configured provider, or a
    /// token not issued for the configured client.
    fn verify(&self, logins: &HashMap<String, String>, session: &Session) -> AuthResult<()> {
        let Some(provider) = &self.provider else {
            return Err(AuthError::ExchangeFailed("no identity provider configured".into()));
        };
        if !logins.contains_key(provider) {
            return Err(AuthError::ExchangeFailed(format!(
                "token issued by {:?}, expected {}",
                session.issuer(),
                provider
            )));
        }
        if !session.audience().iter().any(|aud| *aud == self.client_id) {
            return Err(AuthError::ExchangeFailed(format!(
                "token not issued for client {}",
                self.client_id
            )));
        }
        Ok(())
    }

    /// Credentials for the local operator when no provider is configured.
    pub fn operator_credentials(&self) -> StorageCredentials {
        warn!(pool = %self.identity_pool_id, "Issuing local operator credentials");
        self.issue("operator")
    }

    fn issue(&self, subject: &str) -> StorageCredentials {
        let key = Uuid::new_v4().simple().to_string().to_uppercase();
        StorageCredentials {
            identity_id: format!("{}:{}", self.region, subject),
            access_key_id: format!("LOCAL{}", &key[..16]),
            secret_access_key: Uuid::new_v4().simple().to_string(),
            session_token: Uuid::new_v4().to_string(),
            region: self.region.clone(),
            expires_at: Utc::now() + self.lifetime,
        }
    }
}

impl CredentialExchange for LocalIdentityPool {
    async fn exchange(&self, session: &Session) -> AuthResult<StorageCredentials> {
        if session.is_expired() {
            return Err(AuthError::TokenExpired);
        }

        let logins = self.logins(session)?;
        debug!(
            pool = %self.identity_pool_id,
            providers = ?logins.keys().collect::<Vec<_>>(),
            "Exchanging ID token"
        );
        if let Err(err) = self.verify(&logins, session) {
            warn!(subject = %session.subject(), error = %err, "Credential exchange refused");
            return Err(err);
        }

        let credentials = self.issue(session.subject());
        info!(
            identity_id = %credentials.identity_id,
            expires_at = %credentials.expires_at,
            "Storage credentials issued"
        );
        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{session, token_from, ISSUER};

    fn config() -> StockbookConfig {
        let mut config = StockbookConfig::default();
        config.identity.authority = format!("{}/", ISSUER);
        config.identity.client_id = "client-1".into();
        config
    }

    fn session_from(iss: &str, aud: &str) -> Session {
        let id = token_from(iss, aud, "user-1", Utc::now() + Duration::hours(1));
        Session::from_tokens(&id, "access").unwrap()
    }

    #[tokio::test]
    async fn test_exchange_issues_credentials() {
        let pool = LocalIdentityPool::new(&config()).unwrap();
        let credentials = pool.exchange(&session()).await.unwrap();

        assert_eq!(credentials.identity_id, "local:user-1");
        assert_eq!(credentials.region, "local");
        assert!(credentials.access_key_id.starts_with("LOCAL"));
        assert!(!credentials.is_expired());
        assert!(credentials.ensure_valid().is_ok());
        assert!(credentials.remaining_secs() > 3500);
    }

    #[test]
    fn test_logins_keyed_by_provider_name() {
        let pool = LocalIdentityPool::new(&config()).unwrap();
        let session = session();
        let logins = pool.logins(&session).unwrap();
        assert_eq!(
            logins.get("idp.example.com/pool-1").map(String::as_str),
            Some(session.id_token())
        );
    }

    #[tokio::test]
    async fn test_exchange_refuses_other_issuer() {
        let pool = LocalIdentityPool::new(&config()).unwrap();

        let foreign = session_from("https://idp.example.com/pool-2", "client-1");
        assert!(matches!(
            pool.exchange(&foreign).await,
            Err(AuthError::ExchangeFailed(_))
        ));

        let no_issuer = session_from("", "client-1");
        assert!(matches!(
            pool.exchange(&no_issuer).await,
            Err(AuthError::ExchangeFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_exchange_refuses_other_audience() {
        let pool = LocalIdentityPool::new(&config()).unwrap();
        let session = session_from(ISSUER, "client-2");
        assert!(matches!(
            pool.exchange(&session).await,
            Err(AuthError::ExchangeFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_exchange_without_provider_is_refused() {
        let pool = LocalIdentityPool::new(&StockbookConfig::default()).unwrap();
        assert!(matches!(
            pool.exchange(&session()).await,
            Err(AuthError::ExchangeFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_credentials_rejected() {
        let pool = LocalIdentityPool::new(&config())
            .unwrap()
            .with_lifetime(Duration::seconds(-1));
        let credentials = pool.exchange(&session()).await.unwrap();

        assert!(credentials.is_expired());
        assert_eq!(credentials.remaining_secs(), 0);
        assert!(matches!(
            credentials.ensure_valid(),
            Err(AuthError::CredentialsExpired)
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let pool = LocalIdentityPool::new(&StockbookConfig::default()).unwrap();
        let credentials = pool.operator_credentials();
        let rendered = format!("{:?}", credentials);
        assert!(!rendered.contains(&credentials.secret_access_key));
        assert!(!rendered.contains(&credentials.session_token));
        assert_eq!(credentials.identity_id, "local:operator");
    }
}
