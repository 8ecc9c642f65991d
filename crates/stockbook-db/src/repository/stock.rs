//! # Stock Repository
//!
//! `Retail_Stock` / `Wholesale_Stock` access and execution of planned
//! stock steps.

use tracing::{debug, info};

use stockbook_core::stock::{StockLocation, StockStep};
use stockbook_core::{Channel, Money, StockItem, StockKey};

use crate::error::StoreResult;
use crate::store::{DocumentStore, Key, Table};

fn stock_key(key: &StockKey) -> Key {
    Key::composite(key.item_type.as_str(), key.variation_name.as_str())
}

/// Repository for stock rows of both channels.
#[derive(Debug)]
pub struct StockRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: DocumentStore> StockRepository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        StockRepository { store }
    }

    /// Every row of the channel's table, in scan order.
    pub async fn list(&self, channel: Channel) -> StoreResult<Vec<StockItem>> {
        let docs = self.store.scan(Table::stock(channel)).await?;
        Ok(docs
            .iter()
            .map(|doc| StockItem::from_document(channel, doc))
            .collect())
    }

    pub async fn get(&self, channel: Channel, key: &StockKey) -> StoreResult<Option<StockItem>> {
        let doc = self.store.get(Table::stock(channel), &stock_key(key)).await?;
        Ok(doc.map(|d| StockItem::from_document(channel, &d)))
    }

    /// Writes a full row, replacing any row with the same key.
    pub async fn put(&self, item: &StockItem) -> StoreResult<()> {
        self.store
            .put(Table::stock(item.channel), item.to_document())
            .await
    }

    /// Sets quantity and threshold (and price, when given) on a row.
    pub async fn patch(
        &self,
        location: &StockLocation,
        quantity: i64,
        low_stock_threshold: i64,
        unit_price: Option<Money>,
    ) -> StoreResult<StockItem> {
        let attributes =
            StockStep::patch_attributes(location.channel, quantity, low_stock_threshold, unit_price);
        let doc = self
            .store
            .update(
                Table::stock(location.channel),
                &stock_key(&location.key()),
                attributes,
            )
            .await?;
        Ok(StockItem::from_document(location.channel, &doc))
    }

    pub async fn delete(&self, location: &StockLocation) -> StoreResult<()> {
        self.store
            .delete(Table::stock(location.channel), &stock_key(&location.key()))
            .await
    }

    /// Executes one planned step.
    pub async fn apply(&self, step: &StockStep) -> StoreResult<()> {
        match step {
            StockStep::Delete(location) => {
                debug!(channel = %location.channel, key = %location.key(), "Deleting stock row");
                self.delete(location).await
            }
            StockStep::Put(item) => {
                info!(
                    channel = %item.channel,
                    key = %item.key(),
                    quantity = item.quantity,
                    "Writing stock row"
                );
                self.put(item).await
            }
            StockStep::Patch {
                location,
                quantity,
                low_stock_threshold,
                unit_price,
            } => {
                info!(
                    channel = %location.channel,
                    key = %location.key(),
                    quantity = *quantity,
                    "Patching stock row"
                );
                self.patch(location, *quantity, *low_stock_threshold, *unit_price)
                    .await
                    .map(|_| ())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn item(channel: Channel, variation: &str, qty: i64, price: i64) -> StockItem {
        StockItem {
            channel,
            item_type: "Non-judicial stamp".into(),
            variation_name: variation.into(),
            quantity: qty,
            unit_price: Money::from_units(price),
            low_stock_threshold: 10,
        }
    }

    #[tokio::test]
    async fn test_put_list_get() {
        let store = MemoryStore::new();
        let repo = StockRepository::new(&store);

        repo.put(&item(Channel::Wholesale, "100-90", 3, 90)).await.unwrap();

        assert!(repo.list(Channel::Retail).await.unwrap().is_empty());
        let rows = repo.list(Channel::Wholesale).await.unwrap();
        assert_eq!(rows, vec![item(Channel::Wholesale, "100-90", 3, 90)]);

        let key = StockKey::new("Non-judicial stamp", "100-90");
        assert_eq!(
            repo.get(Channel::Wholesale, &key).await.unwrap().map(|i| i.quantity),
            Some(3)
        );
    }

    #[tokio::test]
    async fn test_patch_preserves_price() {
        let store = MemoryStore::new();
        let repo = StockRepository::new(&store);
        repo.put(&item(Channel::Retail, "50-46", 3, 46)).await.unwrap();

        let location = StockLocation {
            channel: Channel::Retail,
            item_type: "Non-judicial stamp".into(),
            variation_name: "50-46".into(),
        };
        let patched = repo.patch(&location, 8, 4, None).await.unwrap();

        assert_eq!(patched.quantity, 8);
        assert_eq!(patched.low_stock_threshold, 4);
        assert_eq!(patched.unit_price, Money::from_units(46));
    }

    #[tokio::test]
    async fn test_apply_delete() {
        let store = MemoryStore::new();
        let repo = StockRepository::new(&store);
        repo.put(&item(Channel::Retail, "5-3", 1, 3)).await.unwrap();

        repo.apply(&StockStep::Delete(StockLocation {
            channel: Channel::Retail,
            item_type: "Non-judicial stamp".into(),
            variation_name: "5-3".into(),
        }))
        .await
        .unwrap();

        assert!(repo.list(Channel::Retail).await.unwrap().is_empty());
    }
}
