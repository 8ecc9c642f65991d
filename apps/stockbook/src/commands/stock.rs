//! # Stock Commands
//!
//! Stock listing with derived fields, and stock writes executed from a
//! [`StockPlan`].
//!
//! ## Write Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         save_stock(request)                             │
//! │                                                                         │
//! │  validate ──► read original (edit source) and target (submitted key)   │
//! │                   │                                                     │
//! │                   ▼                                                     │
//! │  plan_stock_write ──► [steps], notices, compensation                   │
//! │                   │                                                     │
//! │                   ▼                                                     │
//! │  step 1 ──► step 2 ──► done                                            │
//! │               │ fails                                                   │
//! │               ▼                                                         │
//! │  compensation (restore original) ──► fails too? report both errors     │
//! │                                                                         │
//! │  Between the delete and the write of a move, the item exists in        │
//! │  neither place; a crash in that window loses it until restored.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, error, info, warn};

use stockbook_core::stock::{plan_stock_write, StockLocation, StockNotice, StockPlan, StockRequest, StockView};
use stockbook_core::validation::validate_stock_request;
use stockbook_core::Channel;
use stockbook_db::{DocumentStore, Repositories};

use crate::error::{ApiError, ErrorCode};

/// Result of a stock write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockWriteResult {
    /// The row as stored after the write.
    pub item: Option<StockView>,
    pub notices: Vec<StockNotice>,
}

/// Every row of the channel's table with derived fields.
pub async fn list_stock<S: DocumentStore>(store: &S, channel: Channel) -> Result<Vec<StockView>, ApiError> {
    let items = store.stock().list(channel).await?;
    let views: Vec<StockView> = items.into_iter().map(StockView::from).collect();
    debug!(
        channel = %channel,
        count = views.len(),
        low = views.iter().filter(|v| v.is_low_stock).count(),
        "list_stock"
    );
    Ok(views)
}

/// Adds, edits or moves a stock row.
pub async fn save_stock<S: DocumentStore>(
    store: &S,
    request: StockRequest,
) -> Result<StockWriteResult, ApiError> {
    validate_stock_request(&request)?;

    let repo = store.stock();
    let original = match &request.edit {
        Some(edit) => repo.get(edit.channel, &edit.key()).await?,
        None => None,
    };
    let target = repo.get(request.channel, &request.key()).await?;

    let plan = plan_stock_write(&request, original.as_ref(), target.as_ref())?;
    debug!(
        channel = %request.channel,
        key = %request.key(),
        steps = plan.steps.len(),
        is_move = plan.is_move(),
        "Planned stock write"
    );
    for notice in &plan.notices {
        warn!(channel = %request.channel, key = %request.key(), "{}", notice.message());
    }

    execute_plan(store, &plan).await?;

    let item = repo
        .get(request.channel, &request.key())
        .await?
        .map(StockView::from);
    Ok(StockWriteResult {
        item,
        notices: plan.notices,
    })
}

/// Runs the plan's steps in order, compensating a failed move.
async fn execute_plan<S: DocumentStore>(store: &S, plan: &StockPlan) -> Result<(), ApiError> {
    let repo = store.stock();

    for (index, step) in plan.steps.iter().enumerate() {
        let Err(err) = repo.apply(step).await else {
            continue;
        };

        let compensation = match (&plan.compensation, index) {
            (Some(compensation), i) if i > 0 => compensation,
            _ => return Err(err.into()),
        };

        warn!(error = %err, "Stock move failed after removing the original; restoring it");
        if let Err(restore_err) = repo.apply(compensation).await {
            error!(
                error = %err,
                restore_error = %restore_err,
                "Failed to restore stock row after a failed move"
            );
            return Err(ApiError::new(
                ErrorCode::StorageError,
                format!(
                    "Stock move failed ({}) and the original row could not be restored ({})",
                    err, restore_err
                ),
            ));
        }
        info!("Original stock row restored");
        return Err(err.into());
    }

    Ok(())
}

pub async fn delete_stock<S: DocumentStore>(store: &S, location: &StockLocation) -> Result<(), ApiError> {
    store.stock().delete(location).await?;
    info!(channel = %location.channel, key = %location.key(), "Stock row deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use stockbook_core::{Document, Money, StockItem, MAX_QUANTITY};
    use stockbook_db::{Key, MemoryStore, StoreError, StoreResult, Table};

    fn request(channel: Channel, variation: &str, qty: i64) -> StockRequest {
        StockRequest {
            channel,
            item_type: "Non-judicial stamp".into(),
            variation_name: variation.into(),
            quantity: qty,
            low_stock_threshold: 10,
            unit_price: None,
            edit: None,
        }
    }

    fn location(channel: Channel, variation: &str) -> StockLocation {
        StockLocation {
            channel,
            item_type: "Non-judicial stamp".into(),
            variation_name: variation.into(),
        }
    }

    #[tokio::test]
    async fn test_add_new_then_merge() {
        let store = MemoryStore::new();

        let first = save_stock(&store, request(Channel::Retail, "100-90", 5)).await.unwrap();
        let item = first.item.unwrap();
        assert_eq!(item.item.quantity, 5);
        assert_eq!(item.item.unit_price, Money::from_units(90));
        assert!(item.is_low_stock);
        assert!(first.notices.is_empty());

        let second = save_stock(&store, request(Channel::Retail, "100-90", 7)).await.unwrap();
        assert_eq!(second.item.unwrap().item.quantity, 12);
        assert_eq!(
            second.notices,
            vec![StockNotice::MergedIntoExisting {
                previous_quantity: 5,
                new_quantity: 12
            }]
        );
    }

    #[tokio::test]
    async fn test_edit_same_key_is_absolute() {
        let store = MemoryStore::new();
        save_stock(&store, request(Channel::Retail, "50-46", 20)).await.unwrap();

        let mut edit = request(Channel::Retail, "50-46", 3);
        edit.edit = Some(location(Channel::Retail, "50-46"));
        let result = save_stock(&store, edit).await.unwrap();

        let item = result.item.unwrap();
        assert_eq!(item.item.quantity, 3);
        assert_eq!(item.item.unit_price, Money::from_units(46));
        assert_eq!(list_stock(&store, Channel::Retail).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_edit_moves_between_channels() {
        let store = MemoryStore::new();
        save_stock(&store, request(Channel::Retail, "10-8", 40)).await.unwrap();

        let mut edit = request(Channel::Wholesale, "10-8", 2);
        edit.edit = Some(location(Channel::Retail, "10-8"));
        let result = save_stock(&store, edit).await.unwrap();

        assert!(list_stock(&store, Channel::Retail).await.unwrap().is_empty());
        let wholesale = list_stock(&store, Channel::Wholesale).await.unwrap();
        assert_eq!(wholesale.len(), 1);
        assert_eq!(wholesale[0].item.quantity, 2);
        assert_eq!(wholesale[0].total_value, Money::from_units(8 * 2 * 20));
        assert!(matches!(result.notices[..], [StockNotice::Moved { .. }]));
    }

    #[tokio::test]
    async fn test_edit_with_missing_original_creates() {
        let store = MemoryStore::new();

        let mut edit = request(Channel::Retail, "5-3", 4);
        edit.edit = Some(location(Channel::Retail, "5-2"));
        let result = save_stock(&store, edit).await.unwrap();

        assert_eq!(result.notices, vec![StockNotice::OriginalMissing]);
        assert_eq!(result.item.unwrap().item.quantity, 4);
    }

    #[tokio::test]
    async fn test_rejects_negative_quantity() {
        let store = MemoryStore::new();
        let err = save_stock(&store, request(Channel::Retail, "5-3", -1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(list_stock(&store, Channel::Retail).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_merge_past_max_quantity_leaves_row_unchanged() {
        let store = MemoryStore::new();
        save_stock(&store, request(Channel::Retail, "100-90", MAX_QUANTITY))
            .await
            .unwrap();

        let err = save_stock(&store, request(Channel::Retail, "100-90", 1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::BusinessRule);

        let rows = list_stock(&store, Channel::Retail).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item.quantity, MAX_QUANTITY);
    }

    #[tokio::test]
    async fn test_rejects_quantity_above_max() {
        let store = MemoryStore::new();
        let err = save_stock(&store, request(Channel::Retail, "5-3", MAX_QUANTITY + 1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(list_stock(&store, Channel::Retail).await.unwrap().is_empty());
    }

    /// Memory store that refuses puts to the wholesale table, and
    /// optionally to every table.
    struct BrokenWholesale {
        inner: MemoryStore,
        refuse_all_puts: AtomicBool,
    }

    impl DocumentStore for BrokenWholesale {
        async fn scan(&self, table: Table) -> StoreResult<Vec<Document>> {
            self.inner.scan(table).await
        }

        async fn get(&self, table: Table, key: &Key) -> StoreResult<Option<Document>> {
            self.inner.get(table, key).await
        }

        async fn put(&self, table: Table, doc: Document) -> StoreResult<()> {
            if table == Table::WholesaleStock || self.refuse_all_puts.load(Ordering::SeqCst) {
                return Err(StoreError::QueryFailed("disk full".into()));
            }
            self.inner.put(table, doc).await
        }

        async fn update(&self, table: Table, key: &Key, attributes: Document) -> StoreResult<Document> {
            self.inner.update(table, key, attributes).await
        }

        async fn delete(&self, table: Table, key: &Key) -> StoreResult<()> {
            self.inner.delete(table, key).await
        }
    }

    fn seeded() -> BrokenWholesale {
        BrokenWholesale {
            inner: MemoryStore::new(),
            refuse_all_puts: AtomicBool::new(false),
        }
    }

    async fn seed_retail(store: &BrokenWholesale) {
        store
            .inner
            .stock()
            .put(&StockItem {
                channel: Channel::Retail,
                item_type: "Non-judicial stamp".into(),
                variation_name: "20-16".into(),
                quantity: 9,
                unit_price: Money::from_units(16),
                low_stock_threshold: 10,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_failed_move_restores_original() {
        let store = seeded();
        seed_retail(&store).await;

        let mut edit = request(Channel::Wholesale, "20-16", 1);
        edit.edit = Some(location(Channel::Retail, "20-16"));
        let err = save_stock(&store, edit).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::StorageError);
        let retail = list_stock(&store, Channel::Retail).await.unwrap();
        assert_eq!(retail.len(), 1);
        assert_eq!(retail[0].item.quantity, 9);
    }

    #[tokio::test]
    async fn test_failed_restore_reports_both_errors() {
        let store = seeded();
        seed_retail(&store).await;
        store.refuse_all_puts.store(true, Ordering::SeqCst);

        let mut edit = request(Channel::Wholesale, "20-16", 1);
        edit.edit = Some(location(Channel::Retail, "20-16"));
        let err = save_stock(&store, edit).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::StorageError);
        assert!(err.message.contains("could not be restored"));
        assert!(list_stock(&store, Channel::Retail).await.unwrap().is_empty());
    }
}
