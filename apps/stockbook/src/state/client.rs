//! # Storage Client
//!
//! Wraps a [`DocumentStore`] with the caller's credentials, a per-call
//! timeout and bounded retry. The client is itself a `DocumentStore`, so
//! repositories and commands run on top of it unchanged.
//!
//! ## Call Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         StorageClient::call                             │
//! │                                                                         │
//! │  credentials expired? ──yes──► StoreError::AccessDenied (no call made)  │
//! │         │ no                                                            │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────┐                                       │
//! │  │ tokio::time::timeout(call)   │──► ok ───────────────────► return     │
//! │  └──────────────┬───────────────┘                                       │
//! │                 │ error                                                 │
//! │                 ▼                                                       │
//! │  transient && attempt < max? ──no──► return error                       │
//! │                 │ yes                                                   │
//! │                 ▼                                                       │
//! │  exponential backoff sleep, then call again                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only `Timeout`, `Unavailable` and `ConnectionFailed` are retried. Writes
//! are retried too; every write is a full put or an idempotent patch.

use backoff::ExponentialBackoffBuilder;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use stockbook_auth::{StorageConfig, StorageCredentials};
use stockbook_core::Document;
use stockbook_db::{DocumentStore, Key, StoreError, StoreResult, Table};

// =============================================================================
// Retry Policy
// =============================================================================

/// Timeout and retry settings for store calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    /// Attempts per call, including the first.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            timeout: Duration::from_secs(10),
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &StorageConfig) -> Self {
        RetryPolicy {
            timeout: config.request_timeout(),
            max_attempts: config.max_attempts.max(1),
            initial_backoff: config.initial_backoff(),
            max_backoff: config.max_backoff(),
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Credentialed, retrying access to a document store.
#[derive(Debug)]
pub struct StorageClient<S> {
    store: S,
    credentials: StorageCredentials,
    policy: RetryPolicy,
}

impl<S: DocumentStore> StorageClient<S> {
    pub fn new(store: S, credentials: StorageCredentials) -> Self {
        StorageClient {
            store,
            credentials,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn credentials(&self) -> &StorageCredentials {
        &self.credentials
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The wrapped store, bypassing credentials and retry.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs one store call under the credential check, timeout and retry.
    async fn call<T, F, Fut>(&self, op: &'static str, table: Table, f: F) -> StoreResult<T>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = StoreResult<T>> + Send,
        T: Send,
    {
        if self.credentials.is_expired() {
            warn!(op, table = %table, "Storage credentials expired");
            return Err(StoreError::AccessDenied(
                "storage credentials expired; sign in again".into(),
            ));
        }

        let timeout = self.policy.timeout;
        let max_attempts = self.policy.max_attempts;
        let attempts = AtomicU32::new(0);

        let backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.policy.initial_backoff)
            .with_max_interval(self.policy.max_backoff)
            .with_max_elapsed_time(None)
            .build();

        let operation = || {
            let attempt = attempts.fetch_add(1, Ordering::Relaxed) + 1;
            let call = f();
            async move {
                let result = match tokio::time::timeout(timeout, call).await {
                    Ok(result) => result,
                    Err(_) => Err(StoreError::Timeout {
                        millis: timeout.as_millis() as u64,
                    }),
                };
                result.map_err(|err| {
                    if err.is_transient() && attempt < max_attempts {
                        backoff::Error::transient(err)
                    } else {
                        backoff::Error::permanent(err)
                    }
                })
            }
        };

        let notify = |err: StoreError, wait: Duration| {
            warn!(
                op,
                table = %table,
                error = %err,
                wait_ms = wait.as_millis() as u64,
                "Retrying store call"
            );
        };

        let result = backoff::future::retry_notify(backoff, operation, notify).await;
        debug!(
            op,
            table = %table,
            attempts = attempts.load(Ordering::Relaxed),
            ok = result.is_ok(),
            "Store call finished"
        );
        result
    }
}

impl<S: DocumentStore> DocumentStore for StorageClient<S> {
    async fn scan(&self, table: Table) -> StoreResult<Vec<Document>> {
        self.call("scan", table, || self.store.scan(table)).await
    }

    async fn get(&self, table: Table, key: &Key) -> StoreResult<Option<Document>> {
        self.call("get", table, || self.store.get(table, key)).await
    }

    async fn put(&self, table: Table, doc: Document) -> StoreResult<()> {
        self.call("put", table, || self.store.put(table, doc.clone()))
            .await
    }

    async fn update(&self, table: Table, key: &Key, attributes: Document) -> StoreResult<Document> {
        self.call("update", table, || {
            self.store.update(table, key, attributes.clone())
        })
        .await
    }

    async fn delete(&self, table: Table, key: &Key) -> StoreResult<()> {
        self.call("delete", table, || self.store.delete(table, key)).await
    }
}
