//! # SQLite Document Store
//!
//! Connection pool creation and the SQLite-backed [`DocumentStore`].
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SQLite Document Store                              │
//! │                                                                         │
//! │  DbConfig::new(path) ← Configure pool settings                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteStore::new(config).await ← Create pool + run migrations         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────────────────────┐      │
//! │  │ documents                                                    │      │
//! │  │ ─────────────────────────────────────────────────────────────│      │
//! │  │ table_name           pk                   body (JSON)        │      │
//! │  │ Retail_Stock         ["Folio Paper","F_6"] {"ItemType":...}  │      │
//! │  │ Transaction_Retail   retail-17040...       {"Date":...}      │      │
//! │  │ Customer_Information 3f2c...               {"Name":...}      │      │
//! │  └──────────────────────────────────────────────────────────────┘      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled so scans don't block
//! writes.

use chrono::Utc;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use stockbook_core::Document;

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::store::{apply_patch, DocumentStore, Key, Table};

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust
/// use stockbook_db::DbConfig;
///
/// let config = DbConfig::new("/path/to/stockbook.db")
///     .max_connections(5)
///     .min_connections(1);
/// assert_eq!(config.max_connections, 5);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a configuration for the database file at `path`.
    /// The file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }
}

// =============================================================================
// SqliteStore
// =============================================================================

/// Document store persisted in a single SQLite table.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens the database and prepares the pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Enables WAL mode with NORMAL synchronous
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    pub async fn new(config: DbConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing document store"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let store = SqliteStore { pool };

        if config.run_migrations {
            store.run_migrations().await?;
        }

        Ok(store)
    }

    /// Applies pending embedded migrations. Idempotent.
    pub async fn run_migrations(&self) -> StoreResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the connection pool. Later calls fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    async fn fetch_one_body(&self, table: Table, key: &Key) -> StoreResult<Option<Document>> {
        let row = sqlx::query("SELECT body FROM documents WHERE table_name = ?1 AND pk = ?2")
            .bind(table.name())
            .bind(key.encode())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| decode_body(r.try_get::<String, _>("body")?))
            .transpose()
    }

    async fn write_body(&self, table: Table, key: &Key, doc: &Document) -> StoreResult<()> {
        let body = serde_json::to_string(doc)?;
        sqlx::query(
            r#"
            INSERT INTO documents (table_name, pk, body, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (table_name, pk) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(table.name())
        .bind(key.encode())
        .bind(body)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn decode_body(body: String) -> StoreResult<Document> {
    match serde_json::from_str::<Value>(&body)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(format!(
            "stored body is not an object: {other}"
        ))),
    }
}

impl DocumentStore for SqliteStore {
    async fn scan(&self, table: Table) -> StoreResult<Vec<Document>> {
        let rows = sqlx::query("SELECT body FROM documents WHERE table_name = ?1 ORDER BY rowid")
            .bind(table.name())
            .fetch_all(&self.pool)
            .await?;

        debug!(table = %table, count = rows.len(), "Scanned table");

        rows.into_iter()
            .map(|r| decode_body(r.try_get::<String, _>("body")?))
            .collect()
    }

    async fn get(&self, table: Table, key: &Key) -> StoreResult<Option<Document>> {
        table.check_key(key)?;
        self.fetch_one_body(table, key).await
    }

    async fn put(&self, table: Table, doc: Document) -> StoreResult<()> {
        let key = table.key_of(&doc)?;
        debug!(table = %table, key = %key, "Putting record");
        self.write_body(table, &key, &doc).await
    }

    async fn update(&self, table: Table, key: &Key, attributes: Document) -> StoreResult<Document> {
        table.check_key(key)?;
        let current = self.fetch_one_body(table, key).await?;
        let patched = apply_patch(table, key, current, attributes);
        debug!(table = %table, key = %key, "Updating record");
        self.write_body(table, key, &patched).await?;
        Ok(patched)
    }

    async fn delete(&self, table: Table, key: &Key) -> StoreResult<()> {
        table.check_key(key)?;
        let result = sqlx::query("DELETE FROM documents WHERE table_name = ?1 AND pk = ?2")
            .bind(table.name())
            .bind(key.encode())
            .execute(&self.pool)
            .await?;
        debug!(
            table = %table,
            key = %key,
            deleted = result.rows_affected(),
            "Deleted record"
        );
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test documents are objects"),
        }
    }

    async fn store() -> SqliteStore {
        SqliteStore::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_database() {
        let store = store().await;
        assert!(store.health_check().await);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
    }

    #[tokio::test]
    async fn test_put_replaces_and_scan_keeps_insertion_order() {
        let store = store().await;
        let table = Table::TransactionRetail;

        for id in ["t-2", "t-1", "t-3"] {
            store
                .put(table, doc(json!({"TransactionID": id, "NetProfit": "1.00"})))
                .await
                .unwrap();
        }
        store
            .put(table, doc(json!({"TransactionID": "t-1", "NetProfit": "9.00"})))
            .await
            .unwrap();

        let rows = store.scan(table).await.unwrap();
        let ids: Vec<&str> = rows
            .iter()
            .map(|r| r["TransactionID"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["t-2", "t-1", "t-3"]);
        assert_eq!(rows[1]["NetProfit"], json!("9.00"));
    }

    #[tokio::test]
    async fn test_update_upserts_and_preserves_attributes() {
        let store = store().await;
        let table = Table::WholesaleStock;
        let key = Key::composite("Folio Paper", "Folio_6");

        let created = store
            .update(table, &key, doc(json!({"Quantity_packets": 5})))
            .await
            .unwrap();
        assert_eq!(created["ItemType"], json!("Folio Paper"));

        store
            .update(table, &key, doc(json!({"UnitPrice": 6})))
            .await
            .unwrap();

        let stored = store.get(table, &key).await.unwrap().unwrap();
        assert_eq!(stored["Quantity_packets"], json!(5));
        assert_eq!(stored["UnitPrice"], json!(6));
    }

    #[tokio::test]
    async fn test_delete_and_table_isolation() {
        let store = store().await;
        let item = doc(json!({"ItemType": "A", "VariationName": "B"}));
        store.put(Table::RetailStock, item.clone()).await.unwrap();
        store.put(Table::WholesaleStock, item).await.unwrap();

        let key = Key::composite("A", "B");
        store.delete(Table::RetailStock, &key).await.unwrap();

        assert!(store.get(Table::RetailStock, &key).await.unwrap().is_none());
        assert!(store.get(Table::WholesaleStock, &key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_wrong_key_shape_is_rejected() {
        let store = store().await;
        let err = store
            .get(Table::RetailStock, &Key::single("A"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey { .. }));
    }
}
