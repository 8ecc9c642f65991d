//! # OIDC Client
//!
//! Builds the authorization-code redirect and the provider logout URL, and
//! names the provider for the federated credential exchange.
//!
//! ## Sign-in Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Sign-in Flow                                   │
//! │                                                                         │
//! │  ┌────────────┐  1. login_url(state)   ┌────────────────────┐           │
//! │  │ Stockbook  │───────────────────────►│  Identity provider │           │
//! │  │            │                        │  (hosted login)    │           │
//! │  │            │  2. code → tokens      │                    │           │
//! │  │            │◄───────────────────────│                    │           │
//! │  │            │                        └────────────────────┘           │
//! │  │            │  3. Session::from_tokens(id_token, access_token)        │
//! │  │            │  4. CredentialExchange::exchange(&session)              │
//! │  │            │  5. StorageClient::new(store, credentials)              │
//! │  └────────────┘                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The code-for-token exchange itself happens in the hosting page; this
//! crate only consumes the resulting tokens.

use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::config::IdentityConfig;
use crate::error::{AuthError, AuthResult};
use crate::session::Session;

/// Provider-facing half of authentication.
#[derive(Debug, Clone)]
pub struct OidcClient {
    config: IdentityConfig,
}

impl OidcClient {
    /// Validates the identity settings up front.
    pub fn new(config: IdentityConfig) -> AuthResult<Self> {
        config.validate()?;
        Ok(OidcClient { config })
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// Authorization-code redirect for the hosted login page.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let state = stockbook_auth::oidc::new_state();
    /// let url = client.login_url(&state)?;
    /// // https://login.example.com/oauth2/authorize?response_type=code&client_id=...
    /// ```
    pub fn login_url(&self, state: &str) -> AuthResult<Url> {
        let url = Url::parse_with_params(
            &self.config.authorization_endpoint,
            &[
                ("response_type", "code"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", self.config.scope.as_str()),
                ("state", state),
            ],
        )?;
        debug!(endpoint = %self.config.authorization_endpoint, "Built login URL");
        Ok(url)
    }

    /// Provider logout URL that returns to the configured page.
    pub fn logout_url(&self) -> AuthResult<Url> {
        Ok(Url::parse_with_params(
            &self.config.logout_endpoint,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("logout_uri", self.config.post_logout_redirect_uri.as_str()),
            ],
        )?)
    }

    /// Name under which the ID token is presented to the identity pool.
    pub fn provider_name(&self) -> AuthResult<String> {
        provider_login_name(&self.config.authority)
    }

    /// Reads a session from the tokens returned by the provider.
    pub fn sign_in(&self, id_token: &str, access_token: &str) -> AuthResult<Session> {
        Session::from_tokens(id_token, access_token)
    }
}

/// `{host}/{path}` of the authority, without scheme or trailing slash.
pub fn provider_login_name(authority: &str) -> AuthResult<String> {
    let url = Url::parse(authority)?;
    let host = url
        .host_str()
        .ok_or_else(|| AuthError::InvalidConfig(format!("authority has no host: {}", authority)))?;

    let mut name = host.to_string();
    if let Some(port) = url.port() {
        name.push_str(&format!(":{}", port));
    }
    name.push_str(url.path().trim_end_matches('/'));
    Ok(name)
}

/// Random value for the `state` parameter.
pub fn new_state() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn client() -> OidcClient {
        OidcClient::new(IdentityConfig {
            authority: "https://idp.example.com/pool-1".into(),
            client_id: "client-1".into(),
            redirect_uri: "https://app.example.com/".into(),
            post_logout_redirect_uri: "https://app.example.com/bye".into(),
            authorization_endpoint: "https://login.example.com/oauth2/authorize".into(),
            logout_endpoint: "https://login.example.com/logout".into(),
            scope: "openid email phone".into(),
        })
        .unwrap()
    }

    fn query(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn test_login_url() {
        let url = client().login_url("abc").unwrap();
        assert_eq!(url.host_str(), Some("login.example.com"));
        assert_eq!(url.path(), "/oauth2/authorize");

        let params = query(&url);
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["client_id"], "client-1");
        assert_eq!(params["redirect_uri"], "https://app.example.com/");
        assert_eq!(params["scope"], "openid email phone");
        assert_eq!(params["state"], "abc");
    }

    #[test]
    fn test_logout_url() {
        let url = client().logout_url().unwrap();
        let params = query(&url);
        assert_eq!(params["client_id"], "client-1");
        assert_eq!(params["logout_uri"], "https://app.example.com/bye");
    }

    #[test]
    fn test_provider_login_name() {
        assert_eq!(
            provider_login_name("https://idp.example.com/pool-1").unwrap(),
            "idp.example.com/pool-1"
        );
        assert_eq!(
            provider_login_name("https://idp.example.com/pool-1/").unwrap(),
            "idp.example.com/pool-1"
        );
        assert_eq!(
            provider_login_name("http://localhost:9000/realms/shop").unwrap(),
            "localhost:9000/realms/shop"
        );
        assert!(provider_login_name("not a url").is_err());
    }

    #[test]
    fn test_new_client_requires_config() {
        assert!(OidcClient::new(IdentityConfig::default()).is_err());
    }

    #[test]
    fn test_state_is_random() {
        assert_ne!(new_state(), new_state());
        assert_eq!(new_state().len(), 32);
    }
}
