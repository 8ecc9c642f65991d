//! # Transaction Repository
//!
//! `Transaction_Retail` / `Transaction_Wholesale` access. Reads go through
//! the normalizer, so callers only ever see canonical [`Transaction`]s.

use stockbook_core::normalize;
use stockbook_core::{Channel, Transaction};

use crate::error::StoreResult;
use crate::store::{DocumentStore, Key, Table};

/// Repository for transactions of both channels.
#[derive(Debug)]
pub struct TransactionRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: DocumentStore> TransactionRepository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        TransactionRepository { store }
    }

    /// Every transaction of the channel, normalized, in scan order.
    pub async fn list(&self, channel: Channel) -> StoreResult<Vec<Transaction>> {
        let docs = self.store.scan(Table::transactions(channel)).await?;
        Ok(normalize::normalize_all(channel, &docs))
    }

    pub async fn get(&self, channel: Channel, transaction_id: &str) -> StoreResult<Option<Transaction>> {
        let doc = self
            .store
            .get(Table::transactions(channel), &Key::single(transaction_id))
            .await?;
        Ok(doc.map(|d| normalize::normalize(channel, &d)))
    }

    /// Writes the full record to the transaction's channel table.
    pub async fn put(&self, tx: &Transaction) -> StoreResult<()> {
        self.store
            .put(Table::transactions(tx.channel), normalize::to_document(tx))
            .await
    }

    pub async fn delete(&self, channel: Channel, transaction_id: &str) -> StoreResult<()> {
        self.store
            .delete(Table::transactions(channel), &Key::single(transaction_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use stockbook_core::normalize::build_transaction;
    use stockbook_core::{Money, TransactionInput};

    fn input() -> TransactionInput {
        TransactionInput {
            customer_id: "c-1".into(),
            date: "2024-01-01".into(),
            time: "10:00".into(),
            product_name: "Non-judicial stamp".into(),
            product_variation: "100-90".into(),
            quantity: 10,
            selling_price: Money::from_units(50),
            cogs: Money::from_units(40),
        }
    }

    #[tokio::test]
    async fn test_put_then_list_normalized() {
        let store = MemoryStore::new();
        let repo = TransactionRepository::new(&store);
        let tx = build_transaction(Channel::Retail, "retail-1-aaaaaaaa".into(), input()).unwrap();

        repo.put(&tx).await.unwrap();

        assert_eq!(repo.list(Channel::Retail).await.unwrap(), vec![tx.clone()]);
        assert!(repo.list(Channel::Wholesale).await.unwrap().is_empty());
        assert_eq!(
            repo.get(Channel::Retail, "retail-1-aaaaaaaa").await.unwrap(),
            Some(tx)
        );
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let repo = TransactionRepository::new(&store);
        let tx = build_transaction(Channel::Wholesale, "wholesale-1-bbbbbbbb".into(), input()).unwrap();
        repo.put(&tx).await.unwrap();

        repo.delete(Channel::Wholesale, &tx.transaction_id).await.unwrap();
        assert!(repo.list(Channel::Wholesale).await.unwrap().is_empty());
    }
}
