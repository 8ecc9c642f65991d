//! # Error Types
//!
//! Domain-specific error types for stockbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockbook-core errors (this file)                                     │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stockbook-db errors (separate crate)                                  │
//! │  └── StoreError       - Document store failures                        │
//! │                                                                         │
//! │  stockbook-auth errors (separate crate)                                │
//! │  └── AuthError        - Token / credential failures                    │
//! │                                                                         │
//! │  App errors                                                            │
//! │  └── ApiError         - What the caller sees (serialized)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Note what is NOT here: malformed stored records. Normalization and
//! aggregation are total and substitute defaults instead of failing.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A channel name that is neither retail nor wholesale.
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// A customer type that is neither retail nor wholesale.
    #[error("Unknown customer type: {0}")]
    UnknownCustomerType(String),

    /// Merging into an existing stock row would push its quantity past the
    /// accepted maximum.
    ///
    /// ## When This Occurs
    /// - Adding stock under a key that already holds a large quantity
    #[error("Stock quantity {existing} + {added} exceeds the maximum of {max}")]
    QuantityOverflow { existing: i64, added: i64, max: i64 },

    /// A computed amount does not fit in the money type.
    ///
    /// ## When This Occurs
    /// - Net profit of a transaction whose inputs bypassed validation
    #[error("{0} is out of range")]
    AmountOverflow(&'static str),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised on the write path only (forms submitting customers, stock and
/// transactions). The read path never validates.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value exceeds the accepted maximum.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: String },

    /// Invalid format (e.g., malformed email, unparsable date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
