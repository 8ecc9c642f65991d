//! # Transaction Commands
//!
//! Record, list, replace and delete sales transactions of either channel.
//! Net profit is computed here on every write and never on read.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use stockbook_core::normalize::{build_transaction, new_transaction_id};
use stockbook_core::validation::validate_transaction_input;
use stockbook_core::{Channel, Transaction, TransactionInput};
use stockbook_db::{DocumentStore, Repositories};

use crate::error::ApiError;

/// Both channels' transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelTransactions {
    pub retail: Vec<Transaction>,
    pub wholesale: Vec<Transaction>,
}

impl ChannelTransactions {
    pub fn len(&self) -> usize {
        self.retail.len() + self.wholesale.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every transaction, retail first.
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.retail.iter().chain(&self.wholesale)
    }
}

pub async fn list_transactions<S: DocumentStore>(
    store: &S,
    channel: Channel,
) -> Result<Vec<Transaction>, ApiError> {
    let txs = store.transactions().list(channel).await?;
    debug!(channel = %channel, count = txs.len(), "list_transactions");
    Ok(txs)
}

/// Fetches both channels concurrently.
pub async fn list_all_transactions<S: DocumentStore>(store: &S) -> Result<ChannelTransactions, ApiError> {
    let repo = store.transactions();
    let (retail, wholesale) = tokio::try_join!(
        repo.list(Channel::Retail),
        repo.list(Channel::Wholesale)
    )?;
    debug!(
        retail = retail.len(),
        wholesale = wholesale.len(),
        "list_all_transactions"
    );
    Ok(ChannelTransactions { retail, wholesale })
}

/// Validates and stores a new transaction under a fresh id.
pub async fn record_transaction<S: DocumentStore>(
    store: &S,
    channel: Channel,
    input: TransactionInput,
) -> Result<Transaction, ApiError> {
    validate_transaction_input(&input)?;

    let id = new_transaction_id(channel, Utc::now().timestamp_millis());
    let tx = build_transaction(channel, id, input)?;
    store.transactions().put(&tx).await?;

    info!(
        transaction_id = %tx.transaction_id,
        channel = %channel,
        quantity = tx.quantity,
        net_profit = %tx.net_profit,
        "Transaction recorded"
    );
    Ok(tx)
}

/// Replaces an existing transaction in full, keeping its id.
pub async fn update_transaction<S: DocumentStore>(
    store: &S,
    channel: Channel,
    transaction_id: &str,
    input: TransactionInput,
) -> Result<Transaction, ApiError> {
    validate_transaction_input(&input)?;

    let repo = store.transactions();
    if repo.get(channel, transaction_id).await?.is_none() {
        return Err(ApiError::not_found("Transaction", transaction_id));
    }

    let tx = build_transaction(channel, transaction_id.to_string(), input)?;
    repo.put(&tx).await?;

    info!(
        transaction_id = %tx.transaction_id,
        channel = %channel,
        net_profit = %tx.net_profit,
        "Transaction updated"
    );
    Ok(tx)
}

pub async fn delete_transaction<S: DocumentStore>(
    store: &S,
    channel: Channel,
    transaction_id: &str,
) -> Result<(), ApiError> {
    store.transactions().delete(channel, transaction_id).await?;
    info!(transaction_id = %transaction_id, channel = %channel, "Transaction deleted");
    Ok(())
}
