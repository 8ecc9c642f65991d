//! # Store Error Types
//!
//! Error types for document store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite error (sqlx::Error) / JSON error (serde_json::Error)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds context and categorization            │
//! │       │                                                                 │
//! │       ├── is_transient()? ──► StorageClient retries with backoff       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (app crate) ← Serialized for the caller                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Document store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record under the requested key.
    ///
    /// ## When This Occurs
    /// - `update` on a repository path that requires the record to exist
    /// - Repository `get_*` helpers that must find a record
    #[error("{table} record not found: {key}")]
    NotFound { table: String, key: String },

    /// A document is missing one of its table's key attributes.
    ///
    /// ## When This Occurs
    /// - `put` of a stock document without `VariationName`
    /// - Key attribute present but empty or not a string
    #[error("Invalid key for {table}: {reason}")]
    InvalidKey { table: String, reason: String },

    /// A stored body could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// The store could not be reached.
    ///
    /// ## When This Occurs
    /// - Database file can't be created or opened
    /// - Pool closed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// The call did not complete in time.
    #[error("Store call timed out after {millis} ms")]
    Timeout { millis: u64 },

    /// The store is temporarily unable to serve requests.
    ///
    /// ## When This Occurs
    /// - Pool exhausted
    /// - Database locked by another writer
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Applying embedded migrations failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// The caller's credentials were refused or have expired.
    ///
    /// ## When This Occurs
    /// - A storage client is used past its credentials' expiry
    #[error("Access denied: {0}")]
    AccessDenied(String),
}

impl StoreError {
    /// Creates a NotFound error for a table and key.
    pub fn not_found(table: impl Into<String>, key: impl Into<String>) -> Self {
        StoreError::NotFound {
            table: table.into(),
            key: key.into(),
        }
    }

    /// Creates an InvalidKey error.
    pub fn invalid_key(table: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::InvalidKey {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Timeout { .. } | StoreError::Unavailable(_) | StoreError::ConnectionFailed(_)
        )
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::PoolTimedOut   → StoreError::Unavailable
/// sqlx::Error::PoolClosed     → StoreError::ConnectionFailed
/// sqlx::Error::Io             → StoreError::ConnectionFailed
/// "database is locked"        → StoreError::Unavailable
/// Other                       → StoreError::QueryFailed
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => StoreError::Unavailable("connection pool exhausted".into()),
            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("pool is closed".into()),
            sqlx::Error::Io(e) => StoreError::ConnectionFailed(e.to_string()),
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                if msg.contains("database is locked") || msg.contains("database is busy") {
                    StoreError::Unavailable(msg.to_string())
                } else {
                    StoreError::QueryFailed(msg.to_string())
                }
            }
            other => StoreError::QueryFailed(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
