//! # Stockbook Library
//!
//! Command layer for the Stockbook inventory and sales ledger, shared by
//! the `stockbook` binary and a frontend bridge.
//!
//! ## Module Organization
//! ```text
//! stockbook/
//! ├── lib.rs          ◄─── You are here (tracing, sign-in, store setup)
//! ├── main.rs         ◄─── CLI
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── client.rs   ◄─── StorageClient (credentials, timeout, retry)
//! │   └── config.rs   ◄─── Configuration state
//! ├── commands/
//! │   ├── customer.rs
//! │   ├── stock.rs
//! │   ├── transaction.rs
//! │   └── report.rs
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. init_tracing ──► EnvFilter, RUST_LOG overrides the default          │
//! │                                                                         │
//! │  2. StockbookConfig::load ──► file, then STOCKBOOK_* variables          │
//! │                                                                         │
//! │  3. authorize ──► ID token ──► Session ──► LocalIdentityPool::exchange  │
//! │                   (no token: operator credentials)                      │
//! │                                                                         │
//! │  4. open_store ──► SQLite file under the app data directory             │
//! │                                                                         │
//! │  5. StorageClient::new(store, credentials).with_policy(..)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use stockbook_auth::{CredentialExchange, LocalIdentityPool, Session, StockbookConfig, StorageCredentials};
use stockbook_db::{DbConfig, SqliteStore};

use error::ApiError;
use state::ConfigState;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=stockbook_db=trace` - Trace store calls only
/// - Default: INFO, DEBUG for the app crate
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockbook=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .with_writer(std::io::stderr)
        .init();
}

/// Turns an ID token into storage credentials.
///
/// Without a token the local operator identity is used.
pub async fn authorize(
    config: &StockbookConfig,
    id_token: Option<&str>,
    access_token: Option<&str>,
) -> Result<StorageCredentials, ApiError> {
    let pool = LocalIdentityPool::new(config)?;

    let Some(id_token) = id_token else {
        return Ok(pool.operator_credentials());
    };

    let session = Session::from_tokens(id_token, access_token.unwrap_or_default())?;
    info!(subject = %session.subject(), "Signed in");
    Ok(pool.exchange(&session).await?)
}

/// Opens the SQLite store, running migrations.
pub async fn open_store(config: &ConfigState) -> Result<SqliteStore, ApiError> {
    let path = config.database_path()?;
    info!(?path, "Opening database");
    Ok(SqliteStore::new(DbConfig::new(path)).await?)
}
