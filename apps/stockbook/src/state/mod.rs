//! # State Module
//!
//! Long-lived values commands run against.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────────┐  ┌──────────────────────────────┐    │
//! │  │   StorageClient<S>           │  │   ConfigState                │    │
//! │  │                              │  │                              │    │
//! │  │  S: SqliteStore/MemoryStore  │  │  StockbookConfig             │    │
//! │  │  StorageCredentials          │  │  ReportOptions               │    │
//! │  │  RetryPolicy                 │  │                              │    │
//! │  └──────────────────────────────┘  └──────────────────────────────┘    │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • StorageClient: the wrapped store is Send + Sync; the client holds   │
//! │    no mutable state                                                    │
//! │  • ConfigState: read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod client;
mod config;

pub use client::{RetryPolicy, StorageClient};
pub use config::ConfigState;

#[cfg(test)]
pub(crate) use client::tests::credentials;
