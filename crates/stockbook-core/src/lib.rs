//! # stockbook-core: Pure Business Logic for Stockbook
//!
//! This crate holds every business rule of Stockbook as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 apps/stockbook (commands + CLI)                 │   │
//! │  │   list_stock, save_stock, record_transaction, load_reports     │   │
//! │  └───────────────┬───────────────────────────────┬─────────────────┘   │
//! │                  │                               │                      │
//! │  ┌───────────────▼───────────────────┐   ┌───────▼─────────────────┐   │
//! │  │   ★ stockbook-core (THIS CRATE) ★  │   │  stockbook-db / -auth   │   │
//! │  │                                   │   │  documents, credentials │   │
//! │  │  normalize ──► report             │   └─────────────────────────┘   │
//! │  │  stock (read model + write plan)  │                                  │
//! │  │  conventions, money, validation   │                                  │
//! │  │                                   │                                  │
//! │  │  NO I/O • NO STORE • NO NETWORK   │                                  │
//! │  └───────────────────────────────────┘                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Channel, Customer, StockItem, Transaction)
//! - [`money`] - Money type with integer arithmetic
//! - [`document`] - Lenient readers over schemaless stored records
//! - [`conventions`] - Unit sizes, price-from-name, value and profit formulas
//! - [`normalize`] - Channel documents to canonical transactions and back
//! - [`report`] - The nine report views
//! - [`stock`] - Stock read model and write planning
//! - [`validation`] - Write-path validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use stockbook_core::conventions::net_profit;
//! use stockbook_core::{Channel, Money};
//!
//! // 10 pieces at 50, costing 40 each
//! let profit = net_profit(Channel::Retail, 10, Money::from_units(50), Money::from_units(40));
//! assert_eq!(profit.unwrap().to_string(), "100.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod conventions;
pub mod document;
pub mod error;
pub mod money;
pub mod normalize;
pub mod report;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use document::Document;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Pieces in one wholesale packet.
pub const PIECES_PER_PACKET: i64 = 20;

/// Threshold assumed for stock rows stored without one.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Length of the top-products and customer-frequency lists.
pub const TOP_N: usize = 10;

/// Longest accepted value for a free-text form field.
pub const MAX_TEXT_LENGTH: usize = 200;

/// Largest quantity (stock or sale) accepted on the write path.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Largest per-unit price accepted on the write path.
pub const MAX_UNIT_PRICE: Money = Money::from_units(10_000_000);

/// Stored integers beyond this magnitude are treated as malformed and read
/// as zero.
pub const MAX_STORED_INTEGER: i64 = 1_000_000_000_000;
