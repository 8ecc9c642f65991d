//! # Stockbook Configuration
//!
//! Identity-provider and storage settings. Nothing provider-specific is
//! compiled in; every identifier comes from the config file or environment.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKBOOK_OIDC_AUTHORITY=https://idp.example.com/pool              │
//! │     STOCKBOOK_DB_PATH=./stockbook.db                                   │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/stockbook/stockbook.toml (Linux)                         │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     Empty identity section, local storage                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [identity]
//! authority = "https://idp.example.com/pool-id"
//! client_id = "app-client-id"
//! redirect_uri = "https://stockbook.example.com/"
//! post_logout_redirect_uri = "https://stockbook.example.com/"
//! authorization_endpoint = "https://login.example.com/oauth2/authorize"
//! logout_endpoint = "https://login.example.com/logout"
//! scope = "openid email phone"
//!
//! [storage]
//! region = "local"
//! identity_pool_id = "local:stockbook"
//! database_path = "stockbook.db"
//! request_timeout_secs = 10
//! max_attempts = 3
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{AuthError, AuthResult};

// =============================================================================
// Identity Settings
// =============================================================================

/// OIDC provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Issuer URL; its host and path also name the provider in the
    /// credential exchange.
    #[serde(default)]
    pub authority: String,

    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub redirect_uri: String,

    #[serde(default)]
    pub post_logout_redirect_uri: String,

    #[serde(default)]
    pub authorization_endpoint: String,

    #[serde(default)]
    pub logout_endpoint: String,

    #[serde(default = "default_scope")]
    pub scope: String,
}

fn default_scope() -> String {
    "openid email phone".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        IdentityConfig {
            authority: String::new(),
            client_id: String::new(),
            redirect_uri: String::new(),
            post_logout_redirect_uri: String::new(),
            authorization_endpoint: String::new(),
            logout_endpoint: String::new(),
            scope: default_scope(),
        }
    }
}

impl IdentityConfig {
    /// True when any identity value has been provided.
    pub fn is_configured(&self) -> bool {
        !(self.authority.is_empty()
            && self.client_id.is_empty()
            && self.authorization_endpoint.is_empty())
    }

    /// Requires every value the login and logout flows need.
    pub fn validate(&self) -> AuthResult<()> {
        let required: [(&'static str, &str); 6] = [
            ("identity.authority", self.authority.as_str()),
            ("identity.client_id", self.client_id.as_str()),
            ("identity.redirect_uri", self.redirect_uri.as_str()),
            ("identity.post_logout_redirect_uri", self.post_logout_redirect_uri.as_str()),
            ("identity.authorization_endpoint", self.authorization_endpoint.as_str()),
            ("identity.logout_endpoint", self.logout_endpoint.as_str()),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AuthError::MissingConfig(name));
            }
        }
        if self.scope.trim().is_empty() {
            return Err(AuthError::MissingConfig("identity.scope"));
        }
        self.validate_urls()
    }

    /// Checks that every non-empty URL value is http(s).
    fn validate_urls(&self) -> AuthResult<()> {
        let urls = [
            ("identity.authority", &self.authority),
            ("identity.redirect_uri", &self.redirect_uri),
            ("identity.post_logout_redirect_uri", &self.post_logout_redirect_uri),
            ("identity.authorization_endpoint", &self.authorization_endpoint),
            ("identity.logout_endpoint", &self.logout_endpoint),
        ];
        for (name, value) in urls {
            if value.is_empty() {
                continue;
            }
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(AuthError::InvalidConfig(format!(
                    "{} must start with http:// or https://, got: {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Storage and federated-identity settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_identity_pool_id")]
    pub identity_pool_id: String,

    /// SQLite file backing the local document store.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Per-call timeout (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Attempts per call, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

fn default_region() -> String {
    "local".to_string()
}
fn default_identity_pool_id() -> String {
    "local:stockbook".to_string()
}
fn default_database_path() -> PathBuf {
    PathBuf::from("stockbook.db")
}
fn default_request_timeout() -> u64 {
    10
}
fn default_max_attempts() -> u32 {
    3
}
fn default_initial_backoff() -> u64 {
    200
}
fn default_max_backoff() -> u64 {
    2000
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            region: default_region(),
            identity_pool_id: default_identity_pool_id(),
            database_path: default_database_path(),
            request_timeout_secs: default_request_timeout(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

impl StorageConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    pub fn validate(&self) -> AuthResult<()> {
        if self.region.trim().is_empty() {
            return Err(AuthError::MissingConfig("storage.region"));
        }
        if self.identity_pool_id.trim().is_empty() {
            return Err(AuthError::MissingConfig("storage.identity_pool_id"));
        }
        if self.request_timeout_secs == 0 {
            return Err(AuthError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(AuthError::InvalidConfig(
                "max_attempts must be greater than 0".into(),
            ));
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(AuthError::InvalidConfig(
                "initial_backoff_ms must not exceed max_backoff_ms".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockbookConfig {
    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl StockbookConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (stockbook.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> AuthResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn from_toml(contents: &str) -> AuthResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Storage settings always; identity settings only once any is given,
    /// since local use needs no provider.
    pub fn validate(&self) -> AuthResult<()> {
        self.storage.validate()?;
        if self.identity.is_configured() {
            self.identity.validate()?;
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from a variable lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let identity = &mut self.identity;
        let string_fields: [(&str, &mut String); 7] = [
            ("STOCKBOOK_OIDC_AUTHORITY", &mut identity.authority),
            ("STOCKBOOK_OIDC_CLIENT_ID", &mut identity.client_id),
            ("STOCKBOOK_OIDC_REDIRECT_URI", &mut identity.redirect_uri),
            (
                "STOCKBOOK_OIDC_LOGOUT_REDIRECT_URI",
                &mut identity.post_logout_redirect_uri,
            ),
            (
                "STOCKBOOK_OIDC_AUTHORIZATION_ENDPOINT",
                &mut identity.authorization_endpoint,
            ),
            ("STOCKBOOK_OIDC_LOGOUT_ENDPOINT", &mut identity.logout_endpoint),
            ("STOCKBOOK_OIDC_SCOPE", &mut identity.scope),
        ];
        for (name, field) in string_fields {
            if let Some(value) = lookup(name) {
                debug!(var = name, "Overriding identity setting from environment");
                *field = value;
            }
        }

        if let Some(region) = lookup("STOCKBOOK_STORAGE_REGION") {
            self.storage.region = region;
        }
        if let Some(pool) = lookup("STOCKBOOK_IDENTITY_POOL_ID") {
            self.storage.identity_pool_id = pool;
        }
        if let Some(path) = lookup("STOCKBOOK_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = PathBuf::from(path);
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockbook", "stockbook")
            .map(|dirs| dirs.config_dir().join("stockbook.toml"))
    }
}
