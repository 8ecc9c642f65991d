//! # Session
//!
//! The signed-in user, read from the provider's ID token. A session is an
//! explicit value: commands receive it (or credentials derived from it)
//! instead of consulting ambient state.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::fmt;
use tracing::info;
use url::Url;

use crate::error::{AuthError, AuthResult};
use crate::oidc::OidcClient;

/// Claims read from the ID token.
#[derive(Debug, Clone, Deserialize)]
struct IdTokenClaims {
    sub: String,
    exp: i64,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    iss: String,
    #[serde(default)]
    aud: Audience,
}

/// `aud` is either one client id or a list of them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
enum Audience {
    #[default]
    None,
    One(String),
    Many(Vec<String>),
}

impl Audience {
    fn into_vec(self) -> Vec<String> {
        match self {
            Audience::None => Vec::new(),
            Audience::One(aud) => vec![aud],
            Audience::Many(auds) => auds,
        }
    }
}

/// An authenticated user.
#[derive(Clone)]
pub struct Session {
    id_token: String,
    access_token: String,
    subject: String,
    email: Option<String>,
    issuer: String,
    audience: Vec<String>,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// Reads `sub`, `exp`, `email`, `iss` and `aud` from the ID token.
    ///
    /// The signature is not checked here. The identity pool checks the
    /// issuer and audience when the token is exchanged for storage
    /// credentials.
    pub fn from_tokens(id_token: &str, access_token: &str) -> AuthResult<Self> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.insecure_disable_signature_validation();
        validation.validate_aud = false;
        validation.validate_exp = false;

        let claims = decode::<IdTokenClaims>(id_token, &DecodingKey::from_secret(&[]), &validation)?
            .claims;

        if claims.sub.is_empty() {
            return Err(AuthError::InvalidToken("empty sub claim".into()));
        }

        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| AuthError::InvalidToken(format!("exp out of range: {}", claims.exp)))?;
        if expires_at <= Utc::now() {
            return Err(AuthError::TokenExpired);
        }

        info!(subject = %claims.sub, %expires_at, "Session established");

        Ok(Session {
            id_token: id_token.to_string(),
            access_token: access_token.to_string(),
            subject: claims.sub,
            email: claims.email.filter(|e| !e.is_empty()),
            issuer: claims.iss,
            audience: claims.aud.into_vec(),
            expires_at,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// The `iss` claim, empty when the token has none.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Client ids the token was issued for.
    pub fn audience(&self) -> &[String] {
        &self.audience
    }

    pub fn id_token(&self) -> &str {
        &self.id_token
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Ends the session, returning where to send the browser.
    pub fn sign_out(self, client: &OidcClient) -> AuthResult<Url> {
        let url = client.logout_url()?;
        info!(subject = %self.subject, "Session signed out");
        Ok(url)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("subject", &self.subject)
            .field("email", &self.email)
            .field("issuer", &self.issuer)
            .field("expires_at", &self.expires_at)
            .field("id_token", &"<redacted>")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::IdentityConfig;
    use chrono::Duration;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    pub(crate) const ISSUER: &str = "https://idp.example.com/pool-1";

    #[derive(Serialize)]
    struct TestClaims<'a, A: Serialize> {
        sub: &'a str,
        exp: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        email: Option<&'a str>,
        iss: &'a str,
        aud: A,
    }

    /// HS256 token with the given issuer and audience.
    pub(crate) fn token_from<A: Serialize>(iss: &str, aud: A, sub: &str, exp: DateTime<Utc>) -> String {
        encode(
            &Header::default(),
            &TestClaims {
                sub,
                exp: exp.timestamp(),
                email: None,
                iss,
                aud,
            },
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap()
    }

    pub(crate) fn token(sub: &str, exp: DateTime<Utc>, email: Option<&str>) -> String {
        encode(
            &Header::default(),
            &TestClaims {
                sub,
                exp: exp.timestamp(),
                email,
                iss: ISSUER,
                aud: "client-1",
            },
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap()
    }

    pub(crate) fn session() -> Session {
        let id = token("user-1", Utc::now() + Duration::hours(1), Some("a@b.com"));
        Session::from_tokens(&id, "access").unwrap()
    }

    #[test]
    fn test_from_tokens_reads_claims() {
        let session = session();
        assert_eq!(session.subject(), "user-1");
        assert_eq!(session.email(), Some("a@b.com"));
        assert_eq!(session.access_token(), "access");
        assert!(!session.is_expired());
    }

    #[test]
    fn test_issuer_and_audience() {
        let session = session();
        assert_eq!(session.issuer(), ISSUER);
        assert_eq!(session.audience(), ["client-1".to_string()]);

        let id = token_from(ISSUER, ["client-1", "client-2"], "user-1", Utc::now() + Duration::hours(1));
        let session = Session::from_tokens(&id, "access").unwrap();
        assert_eq!(session.audience().len(), 2);
    }

    #[test]
    fn test_email_is_optional() {
        let id = token("user-2", Utc::now() + Duration::hours(1), None);
        let session = Session::from_tokens(&id, "access").unwrap();
        assert_eq!(session.email(), None);
    }

    #[test]
    fn test_expired_token() {
        let id = token("user-1", Utc::now() - Duration::minutes(5), None);
        assert!(matches!(
            Session::from_tokens(&id, "access"),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(
            Session::from_tokens("not.a.jwt", "access"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let session = session();
        let rendered = format!("{:?}", session);
        assert!(rendered.contains("user-1"));
        assert!(!rendered.contains(session.id_token()));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_sign_out_returns_logout_url() {
        let client = OidcClient::new(IdentityConfig {
            authority: "https://idp.example.com/pool-1".into(),
            client_id: "client-1".into(),
            redirect_uri: "https://app.example.com/".into(),
            post_logout_redirect_uri: "https://app.example.com/bye".into(),
            authorization_endpoint: "https://login.example.com/oauth2/authorize".into(),
            logout_endpoint: "https://login.example.com/logout".into(),
            scope: "openid".into(),
        })
        .unwrap();

        let url = session().sign_out(&client).unwrap();
        assert_eq!(url.path(), "/logout");
        assert!(url.query().unwrap_or_default().contains("client_id=client-1"));
    }
}
