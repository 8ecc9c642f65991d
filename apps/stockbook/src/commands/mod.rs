//! # Commands Module
//!
//! Every operation the frontend and the CLI call.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs          ◄─── You are here (exports)
//! ├── customer.rs     ◄─── Customer CRUD and id lookups
//! ├── stock.rs        ◄─── Stock listing and plan execution
//! ├── transaction.rs  ◄─── Transaction record/replace/delete
//! └── report.rs       ◄─── Report envelope
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  caller (CLI / frontend bridge)                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  async fn list_stock<S: DocumentStore>(                                 │
//! │      store: &S,           ◄── StorageClient<SqliteStore> in production │
//! │      channel: Channel,                                                  │
//! │  ) -> Result<Vec<StockView>, ApiError>                                  │
//! │         │                                                               │
//! │         │ (JSON serialization)                                          │
//! │         ▼                                                               │
//! │  caller receives: StockView[] or { code, message }                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands are generic over the store so tests run them against
//! `MemoryStore` directly.

pub mod customer;
pub mod report;
pub mod stock;
pub mod transaction;
