//! # Repository Module
//!
//! Typed access to the document tables.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Command                                                               │
//! │       │  store.stock().list(Channel::Wholesale)                        │
//! │       ▼                                                                 │
//! │  StockRepository<'_, S>                                                │
//! │  ├── list / get        Document ──► StockItem (lenient read)           │
//! │  ├── put / patch       StockItem ──► Document                          │
//! │  └── apply(step)       executes one StockStep                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  S: DocumentStore  (SqliteStore, MemoryStore, StorageClient<_>)        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories borrow the store; they hold no state of their own.
//!
//! ## Available Repositories
//!
//! - [`CustomerRepository`] - `Customer_Information`
//! - [`StockRepository`] - `Retail_Stock` / `Wholesale_Stock`
//! - [`TransactionRepository`] - `Transaction_Retail` / `Transaction_Wholesale`

pub mod customer;
pub mod stock;
pub mod transaction;

pub use customer::CustomerRepository;
pub use stock::StockRepository;
pub use transaction::TransactionRepository;

use crate::store::DocumentStore;

/// Repository accessors for any document store.
///
/// ## Example
/// ```rust
/// use stockbook_db::{MemoryStore, Repositories};
///
/// let store = MemoryStore::new();
/// let _customers = store.customers();
/// ```
pub trait Repositories: DocumentStore + Sized {
    fn customers(&self) -> CustomerRepository<'_, Self> {
        CustomerRepository::new(self)
    }

    fn stock(&self) -> StockRepository<'_, Self> {
        StockRepository::new(self)
    }

    fn transactions(&self) -> TransactionRepository<'_, Self> {
        TransactionRepository::new(self)
    }
}

impl<S: DocumentStore> Repositories for S {}
