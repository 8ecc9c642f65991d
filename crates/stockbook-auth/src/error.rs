//! # Auth Error Types
//!
//! Errors raised while loading identity configuration, reading ID tokens
//! and exchanging them for storage credentials.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Auth Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Tokens      │  │     Credentials         │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  InvalidToken   │  │  ExchangeFailed         │ │
//! │  │  MissingConfig  │  │  TokenExpired   │  │  CredentialsExpired     │ │
//! │  │  ConfigIo/Parse │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth error type.
#[derive(Debug, Error)]
pub enum AuthError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// A configured value is malformed.
    ///
    /// ## When This Occurs
    /// - An endpoint is not an http(s) URL
    /// - A retry setting is zero
    #[error("Invalid auth configuration: {0}")]
    InvalidConfig(String),

    /// A required value is empty.
    #[error("Missing configuration value: {0}")]
    MissingConfig(&'static str),

    /// Config file could not be read.
    #[error("Failed to read config: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Config file is not valid TOML for the expected shape.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // =========================================================================
    // Token Errors
    // =========================================================================
    /// The ID token could not be decoded or lacks required claims.
    #[error("Invalid ID token: {0}")]
    InvalidToken(String),

    /// The ID token's `exp` is in the past.
    #[error("ID token expired")]
    TokenExpired,

    // =========================================================================
    // Credential Errors
    // =========================================================================
    /// Temporary storage credentials are past their expiry.
    ///
    /// ## When This Occurs
    /// The storage client checks expiry before every call; the user must
    /// sign in again to obtain fresh credentials.
    #[error("Storage credentials expired")]
    CredentialsExpired,

    /// The identity pool refused or failed the exchange.
    #[error("Credential exchange failed: {0}")]
    ExchangeFailed(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken(err.to_string()),
        }
    }
}

impl From<url::ParseError> for AuthError {
    fn from(err: url::ParseError) -> Self {
        AuthError::InvalidConfig(format!("invalid URL: {}", err))
    }
}
