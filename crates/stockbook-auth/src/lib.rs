//! # stockbook-auth: Identity and Storage Credentials
//!
//! Signs users in against an OIDC provider and exchanges their ID token for
//! temporary credentials to the document store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Stockbook Auth Layer                            │
//! │                                                                         │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────────────────┐ │
//! │  │ config        │   │ oidc          │   │ exchange                  │ │
//! │  │ TOML + env    │──►│ login/logout  │   │ CredentialExchange        │ │
//! │  │ validation    │   │ URLs          │   │ LocalIdentityPool         │ │
//! │  └───────────────┘   └───────┬───────┘   └─────────────▲─────────────┘ │
//! │                              │                         │               │
//! │                              ▼                         │               │
//! │                      ┌───────────────┐                 │               │
//! │                      │ session       │─────────────────┘               │
//! │                      │ ID token      │                                 │
//! │                      │ claims        │                                 │
//! │                      └───────────────┘                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - Identity and storage configuration
//! - [`oidc`] - Provider redirects
//! - [`session`] - Signed-in user
//! - [`exchange`] - Federated credential exchange
//! - [`error`] - Auth error types

pub mod config;
pub mod error;
pub mod exchange;
pub mod oidc;
pub mod session;

pub use config::{IdentityConfig, StockbookConfig, StorageConfig};
pub use error::{AuthError, AuthResult};
pub use exchange::{CredentialExchange, LocalIdentityPool, StorageCredentials};
pub use oidc::OidcClient;
pub use session::Session;
