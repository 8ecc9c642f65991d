//! # Transaction Normalizer
//!
//! Reshapes raw transaction documents from the two channel tables into the
//! canonical [`Transaction`].
//!
//! ## Why a Tagged Variant?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Transaction_Retail                 Transaction_Wholesale               │
//! │  ──────────────────                 ─────────────────────               │
//! │  Quantity_Pcs                       Quantity_Packets                    │
//! │  SellingPrice_Per_Pc                SellingPrice_Per_Packet             │
//! │  COGS_Per_Pc                        COGS_Per_Packet                     │
//! │        │                                   │                            │
//! │        ▼                                   ▼                            │
//! │  RawTransaction::Retail             RawTransaction::Wholesale           │
//! │        │                                   │                            │
//! │        └──────────────┬────────────────────┘                            │
//! │                       ▼                                                 │
//! │                  Transaction { channel, quantity, selling_price, .. }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The channel-specific attribute names are resolved exactly once, here.
//! Report code never looks at a raw document.
//!
//! ## Leniency
//! Normalization never fails. Missing or wrongly typed fields become `""`
//! or zero. A quantity stored under the other channel's attribute is still
//! picked up.

use serde_json::Value;
use uuid::Uuid;

use crate::conventions;
use crate::document::{self, Document};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Channel, Transaction, TransactionInput};

// =============================================================================
// Channel Records
// =============================================================================

/// A row of `Transaction_Retail`. Quantities are pieces.
#[derive(Debug, Clone, PartialEq)]
pub struct RetailTransaction {
    pub transaction_id: String,
    pub customer_id: String,
    pub date: String,
    pub time: String,
    pub product_name: String,
    pub product_variation: String,
    pub quantity_pcs: i64,
    pub selling_price_per_pc: Money,
    pub cogs_per_pc: Money,
    pub net_profit: Money,
}

/// A row of `Transaction_Wholesale`. Quantities are packets.
#[derive(Debug, Clone, PartialEq)]
pub struct WholesaleTransaction {
    pub transaction_id: String,
    pub customer_id: String,
    pub date: String,
    pub time: String,
    pub product_name: String,
    pub product_variation: String,
    pub quantity_packets: i64,
    pub selling_price_per_packet: Money,
    pub cogs_per_packet: Money,
    pub net_profit: Money,
}

/// A transaction as stored, tagged with the table it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTransaction {
    Retail(RetailTransaction),
    Wholesale(WholesaleTransaction),
}

/// Fields shared by both channel tables.
struct CommonFields {
    transaction_id: String,
    customer_id: String,
    date: String,
    time: String,
    product_name: String,
    product_variation: String,
    net_profit: Money,
}

impl CommonFields {
    fn read(doc: &Document) -> Self {
        CommonFields {
            transaction_id: document::text(doc, "TransactionID"),
            customer_id: document::text(doc, "CustomerID"),
            date: document::text(doc, "Date"),
            time: document::text(doc, "Time"),
            product_name: document::text(doc, "ProductName"),
            product_variation: document::text(doc, "ProductVariation"),
            net_profit: document::money(doc, "NetProfit"),
        }
    }
}

/// Reads the channel's quantity, falling back to the other channel's
/// attribute when the expected one is absent.
fn read_quantity(doc: &Document, channel: Channel) -> i64 {
    let primary = channel.transaction_quantity_field();
    if document::has(doc, primary) {
        return document::integer(doc, primary);
    }
    let other = match channel {
        Channel::Retail => Channel::Wholesale,
        Channel::Wholesale => Channel::Retail,
    };
    document::integer(doc, other.transaction_quantity_field())
}

impl RawTransaction {
    /// Reads a document from the table of `channel`.
    pub fn from_document(channel: Channel, doc: &Document) -> Self {
        let common = CommonFields::read(doc);
        let quantity = read_quantity(doc, channel);
        let selling_price = document::money(doc, channel.selling_price_field());
        let cogs = document::money(doc, channel.cogs_field());

        match channel {
            Channel::Retail => RawTransaction::Retail(RetailTransaction {
                transaction_id: common.transaction_id,
                customer_id: common.customer_id,
                date: common.date,
                time: common.time,
                product_name: common.product_name,
                product_variation: common.product_variation,
                quantity_pcs: quantity,
                selling_price_per_pc: selling_price,
                cogs_per_pc: cogs,
                net_profit: common.net_profit,
            }),
            Channel::Wholesale => RawTransaction::Wholesale(WholesaleTransaction {
                transaction_id: common.transaction_id,
                customer_id: common.customer_id,
                date: common.date,
                time: common.time,
                product_name: common.product_name,
                product_variation: common.product_variation,
                quantity_packets: quantity,
                selling_price_per_packet: selling_price,
                cogs_per_packet: cogs,
                net_profit: common.net_profit,
            }),
        }
    }

    /// Splits a canonical transaction back into its channel record.
    pub fn from_canonical(tx: &Transaction) -> Self {
        match tx.channel {
            Channel::Retail => RawTransaction::Retail(RetailTransaction {
                transaction_id: tx.transaction_id.clone(),
                customer_id: tx.customer_id.clone(),
                date: tx.date.clone(),
                time: tx.time.clone(),
                product_name: tx.product_name.clone(),
                product_variation: tx.product_variation.clone(),
                quantity_pcs: tx.quantity,
                selling_price_per_pc: tx.selling_price,
                cogs_per_pc: tx.cogs,
                net_profit: tx.net_profit,
            }),
            Channel::Wholesale => RawTransaction::Wholesale(WholesaleTransaction {
                transaction_id: tx.transaction_id.clone(),
                customer_id: tx.customer_id.clone(),
                date: tx.date.clone(),
                time: tx.time.clone(),
                product_name: tx.product_name.clone(),
                product_variation: tx.product_variation.clone(),
                quantity_packets: tx.quantity,
                selling_price_per_packet: tx.selling_price,
                cogs_per_packet: tx.cogs,
                net_profit: tx.net_profit,
            }),
        }
    }

    pub fn channel(&self) -> Channel {
        match self {
            RawTransaction::Retail(_) => Channel::Retail,
            RawTransaction::Wholesale(_) => Channel::Wholesale,
        }
    }

    /// Converts to the canonical shape.
    pub fn into_canonical(self) -> Transaction {
        match self {
            RawTransaction::Retail(r) => Transaction {
                transaction_id: r.transaction_id,
                channel: Channel::Retail,
                customer_id: r.customer_id,
                date: r.date,
                time: r.time,
                product_name: r.product_name,
                product_variation: r.product_variation,
                quantity: r.quantity_pcs,
                selling_price: r.selling_price_per_pc,
                cogs: r.cogs_per_pc,
                net_profit: r.net_profit,
            },
            RawTransaction::Wholesale(w) => Transaction {
                transaction_id: w.transaction_id,
                channel: Channel::Wholesale,
                customer_id: w.customer_id,
                date: w.date,
                time: w.time,
                product_name: w.product_name,
                product_variation: w.product_variation,
                quantity: w.quantity_packets,
                selling_price: w.selling_price_per_packet,
                cogs: w.cogs_per_packet,
                net_profit: w.net_profit,
            },
        }
    }

    /// Renders the record with its table's attribute names.
    ///
    /// Monetary attributes are written as two-decimal strings.
    pub fn to_document(&self) -> Document {
        let channel = self.channel();
        let (common, quantity, price, cogs) = match self {
            RawTransaction::Retail(r) => (
                [
                    ("TransactionID", &r.transaction_id),
                    ("CustomerID", &r.customer_id),
                    ("Date", &r.date),
                    ("Time", &r.time),
                    ("ProductName", &r.product_name),
                    ("ProductVariation", &r.product_variation),
                ],
                r.quantity_pcs,
                r.selling_price_per_pc,
                r.cogs_per_pc,
            ),
            RawTransaction::Wholesale(w) => (
                [
                    ("TransactionID", &w.transaction_id),
                    ("CustomerID", &w.customer_id),
                    ("Date", &w.date),
                    ("Time", &w.time),
                    ("ProductName", &w.product_name),
                    ("ProductVariation", &w.product_variation),
                ],
                w.quantity_packets,
                w.selling_price_per_packet,
                w.cogs_per_packet,
            ),
        };

        let mut doc = Document::new();
        for (key, value) in common {
            doc.insert(key.to_string(), Value::from(value.as_str()));
        }
        doc.insert(
            channel.transaction_quantity_field().to_string(),
            Value::from(quantity),
        );
        doc.insert(
            channel.selling_price_field().to_string(),
            Value::from(price.to_decimal_string()),
        );
        doc.insert(
            channel.cogs_field().to_string(),
            Value::from(cogs.to_decimal_string()),
        );
        doc.insert(
            "NetProfit".to_string(),
            Value::from(self.net_profit().to_decimal_string()),
        );
        doc
    }

    fn net_profit(&self) -> Money {
        match self {
            RawTransaction::Retail(r) => r.net_profit,
            RawTransaction::Wholesale(w) => w.net_profit,
        }
    }
}

// =============================================================================
// Public Entry Points
// =============================================================================

/// Normalizes one document from the table of `channel`.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use stockbook_core::normalize::normalize;
/// use stockbook_core::types::Channel;
///
/// let doc = json!({"Quantity_Packets": "3", "SellingPrice_Per_Packet": 500});
/// let tx = normalize(Channel::Wholesale, doc.as_object().unwrap());
/// assert_eq!(tx.quantity, 3);
/// assert_eq!(tx.selling_price.to_string(), "500.00");
/// ```
pub fn normalize(channel: Channel, doc: &Document) -> Transaction {
    RawTransaction::from_document(channel, doc).into_canonical()
}

/// Normalizes every document of one channel table, keeping scan order.
pub fn normalize_all(channel: Channel, docs: &[Document]) -> Vec<Transaction> {
    docs.iter().map(|doc| normalize(channel, doc)).collect()
}

/// Renders a canonical transaction as a document for its channel table.
pub fn to_document(tx: &Transaction) -> Document {
    RawTransaction::from_canonical(tx).to_document()
}

/// Generates a transaction id: `{channel}-{timestampMillis}-{random}`.
///
/// The random part is eight lowercase hex digits.
pub fn new_transaction_id(channel: Channel, timestamp_millis: i64) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", channel.slug(), timestamp_millis, &random[..8])
}

/// Builds the transaction to store for `input`, computing net profit.
///
/// Net profit is derived here and nowhere else; reads take the stored value.
/// Fails with [`CoreError::AmountOverflow`] when the profit does not fit.
pub fn build_transaction(
    channel: Channel,
    transaction_id: String,
    input: TransactionInput,
) -> CoreResult<Transaction> {
    let net_profit =
        conventions::net_profit(channel, input.quantity, input.selling_price, input.cogs)
            .ok_or(CoreError::AmountOverflow("NetProfit"))?;
    Ok(Transaction {
        transaction_id,
        channel,
        customer_id: input.customer_id,
        date: input.date,
        time: input.time,
        product_name: input.product_name,
        product_variation: input.product_variation,
        quantity: input.quantity,
        selling_price: input.selling_price,
        cogs: input.cogs,
        net_profit,
    })
}
