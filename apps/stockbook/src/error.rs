//! # API Error Type
//!
//! Unified error type for commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stockbook                              │
//! │                                                                         │
//! │  Command Function: Result<T, ApiError>                                  │
//! │         │                                                               │
//! │         ├── ValidationError ────────────────► VALIDATION_ERROR          │
//! │         ├── CoreError (unknown channel...) ─► BUSINESS_RULE             │
//! │         ├── StoreError::NotFound ───────────► NOT_FOUND                 │
//! │         ├── StoreError::AccessDenied ───────► AUTH_ERROR                │
//! │         ├── StoreError (other) ─────────────► STORAGE_ERROR             │
//! │         └── AuthError ──────────────────────► AUTH_ERROR                │
//! │                                                                         │
//! │  Caller receives: { "code": "NOT_FOUND", "message": "..." }            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use stockbook_auth::AuthError;
use stockbook_core::{CoreError, ValidationError};
use stockbook_db::StoreError;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Customer not found: 3f2c..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Sign-in required or credentials expired
    AuthError,

    /// The document store failed or was unreachable
    StorageError,

    /// Input validation failed
    ValidationError,

    /// A domain rule rejected the request
    BusinessRule,

    /// Resource not found
    NotFound,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::StorageError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { table, key } => ApiError::not_found(&table, &key),
            StoreError::InvalidKey { table, reason } => {
                ApiError::validation(format!("Invalid key for {}: {}", table, reason))
            }
            StoreError::AccessDenied(reason) => ApiError::new(ErrorCode::AuthError, reason),
            StoreError::Timeout { millis } => {
                ApiError::storage(format!("Storage request timed out after {} ms", millis))
            }
            StoreError::Unavailable(_) | StoreError::ConnectionFailed(_) => {
                ApiError::storage("Storage is unavailable")
            }
            StoreError::QueryFailed(e) | StoreError::Serialization(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Store operation failed: {}", e);
                ApiError::storage("Storage operation failed")
            }
            StoreError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                ApiError::storage("Storage migration failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            other => ApiError::new(ErrorCode::BusinessRule, other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts auth errors to API errors.
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidConfig(_)
            | AuthError::MissingConfig(_)
            | AuthError::ConfigIo(_)
            | AuthError::ConfigParse(_) => {
                tracing::error!("Configuration error: {}", err);
                ApiError::internal(err.to_string())
            }
            other => ApiError::new(ErrorCode::AuthError, other.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
