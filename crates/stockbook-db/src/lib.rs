//! # stockbook-db: Document Store Layer for Stockbook
//!
//! Owns every call to the schemaless document store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Data Flow                              │
//! │                                                                         │
//! │  Command (list_stock, record_transaction, load_reports)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stockbook-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ DocumentStore │    │ Repositories  │    │  Migrations  │  │   │
//! │  │   │  (store.rs)   │◄───│ customer      │    │  (embedded)  │  │   │
//! │  │   │               │    │ stock         │    │              │  │   │
//! │  │   │ SqliteStore   │    │ transaction   │    │ 001_docs.sql │  │   │
//! │  │   │ MemoryStore   │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (documents table) or process memory                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The `DocumentStore` contract, tables and keys
//! - [`pool`] - SQLite pool configuration and `SqliteStore`
//! - [`memory`] - `MemoryStore`
//! - [`migrations`] - Embedded database migrations
//! - [`repository`] - Typed repositories per table
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockbook_db::{DbConfig, Repositories, SqliteStore};
//! use stockbook_core::Channel;
//!
//! let store = SqliteStore::new(DbConfig::new("stockbook.db")).await?;
//! let rows = store.stock().list(Channel::Retail).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use pool::{DbConfig, SqliteStore};
pub use store::{DocumentStore, Key, Table};

pub use repository::{CustomerRepository, Repositories, StockRepository, TransactionRepository};
