//! # Document Store Contract
//!
//! The narrow storage collaborator every Stockbook command goes through.
//!
//! ## Tables
//! ```text
//! ┌──────────────────────────┬───────────────────────────────┐
//! │ Table                    │ Key attributes                │
//! ├──────────────────────────┼───────────────────────────────┤
//! │ Customer_Information     │ CustomerID                    │
//! │ Retail_Stock             │ ItemType + VariationName      │
//! │ Wholesale_Stock          │ ItemType + VariationName      │
//! │ Transaction_Retail       │ TransactionID                 │
//! │ Transaction_Wholesale    │ TransactionID                 │
//! └──────────────────────────┴───────────────────────────────┘
//! ```
//!
//! ## Operations
//! | Operation | Semantics                                                 |
//! |-----------|-----------------------------------------------------------|
//! | `scan`    | every record of the table, in insertion order             |
//! | `get`     | one record by key, `None` when absent                     |
//! | `put`     | full record replace; the key comes from the document      |
//! | `update`  | attribute patch; creates the record when absent           |
//! | `delete`  | remove by key; deleting an absent key is not an error     |
//!
//! There is no conditional write and no cross-table transaction: the last
//! write wins.

use serde_json::Value;
use std::fmt;
use std::future::Future;

use stockbook_core::{Channel, Document};

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Tables
// =============================================================================

/// A logical table of the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    CustomerInformation,
    RetailStock,
    WholesaleStock,
    TransactionRetail,
    TransactionWholesale,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::CustomerInformation,
        Table::RetailStock,
        Table::WholesaleStock,
        Table::TransactionRetail,
        Table::TransactionWholesale,
    ];

    /// The table's name in the store.
    pub fn name(&self) -> &'static str {
        match self {
            Table::CustomerInformation => "Customer_Information",
            Table::RetailStock => "Retail_Stock",
            Table::WholesaleStock => "Wholesale_Stock",
            Table::TransactionRetail => "Transaction_Retail",
            Table::TransactionWholesale => "Transaction_Wholesale",
        }
    }

    /// Key attribute names, partition key first.
    pub fn key_attributes(&self) -> &'static [&'static str] {
        match self {
            Table::CustomerInformation => &["CustomerID"],
            Table::RetailStock | Table::WholesaleStock => &["ItemType", "VariationName"],
            Table::TransactionRetail | Table::TransactionWholesale => &["TransactionID"],
        }
    }

    /// Stock table of a channel.
    pub fn stock(channel: Channel) -> Self {
        match channel {
            Channel::Retail => Table::RetailStock,
            Channel::Wholesale => Table::WholesaleStock,
        }
    }

    /// Transaction table of a channel.
    pub fn transactions(channel: Channel) -> Self {
        match channel {
            Channel::Retail => Table::TransactionRetail,
            Channel::Wholesale => Table::TransactionWholesale,
        }
    }

    /// Extracts the key from a document.
    pub fn key_of(&self, doc: &Document) -> StoreResult<Key> {
        let mut parts = Vec::with_capacity(2);
        for attr in self.key_attributes() {
            match doc.get(*attr) {
                Some(Value::String(s)) if !s.is_empty() => parts.push(s.clone()),
                Some(_) => {
                    return Err(StoreError::invalid_key(
                        self.name(),
                        format!("{attr} must be a non-empty string"),
                    ))
                }
                None => {
                    return Err(StoreError::invalid_key(
                        self.name(),
                        format!("missing {attr}"),
                    ))
                }
            }
        }
        let key = match <[String; 2]>::try_from(parts) {
            Ok([partition, sort]) => Key::Composite(partition, sort),
            Err(mut single) => Key::Single(single.remove(0)),
        };
        Ok(key)
    }

    /// Checks that `key` has the shape this table expects.
    pub fn check_key(&self, key: &Key) -> StoreResult<()> {
        let expected = self.key_attributes().len();
        let actual = match key {
            Key::Single(_) => 1,
            Key::Composite(..) => 2,
        };
        if expected != actual {
            return Err(StoreError::invalid_key(
                self.name(),
                format!("expected {expected} key attribute(s), got {actual}"),
            ));
        }
        Ok(())
    }

    /// The key attributes of `key` as document fields.
    pub fn key_document(&self, key: &Key) -> Document {
        let mut doc = Document::new();
        let values: Vec<&str> = match key {
            Key::Single(v) => vec![v.as_str()],
            Key::Composite(p, s) => vec![p.as_str(), s.as_str()],
        };
        for (attr, value) in self.key_attributes().iter().zip(values) {
            doc.insert((*attr).to_string(), Value::from(value));
        }
        doc
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Keys
// =============================================================================

/// A record key: one attribute or a partition/sort pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Single(String),
    Composite(String, String),
}

impl Key {
    pub fn single(value: impl Into<String>) -> Self {
        Key::Single(value.into())
    }

    pub fn composite(partition: impl Into<String>, sort: impl Into<String>) -> Self {
        Key::Composite(partition.into(), sort.into())
    }

    /// Encoding used as the physical primary key.
    ///
    /// Composite keys encode as a JSON array so no separator character can
    /// make two keys collide.
    pub fn encode(&self) -> String {
        match self {
            Key::Single(v) => v.clone(),
            Key::Composite(p, s) => Value::from(vec![p.as_str(), s.as_str()]).to_string(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Single(v) => f.write_str(v),
            Key::Composite(p, s) => write!(f, "{p}/{s}"),
        }
    }
}

// =============================================================================
// Contract
// =============================================================================

/// Schemaless document table API.
///
/// Implemented by [`SqliteStore`](crate::SqliteStore) and
/// [`MemoryStore`](crate::MemoryStore).
pub trait DocumentStore: Send + Sync {
    /// Returns every record of `table`.
    fn scan(&self, table: Table) -> impl Future<Output = StoreResult<Vec<Document>>> + Send;

    /// Returns the record under `key`, if any.
    fn get(
        &self,
        table: Table,
        key: &Key,
    ) -> impl Future<Output = StoreResult<Option<Document>>> + Send;

    /// Writes a full record, replacing any record with the same key.
    fn put(&self, table: Table, doc: Document) -> impl Future<Output = StoreResult<()>> + Send;

    /// Sets `attributes` on the record under `key`, creating it when absent.
    ///
    /// Returns the record as stored after the patch.
    fn update(
        &self,
        table: Table,
        key: &Key,
        attributes: Document,
    ) -> impl Future<Output = StoreResult<Document>> + Send;

    /// Removes the record under `key`.
    fn delete(&self, table: Table, key: &Key) -> impl Future<Output = StoreResult<()>> + Send;
}

/// Merges `attributes` into `current` (or a fresh keyed record), keeping the
/// key attributes fixed.
pub(crate) fn apply_patch(
    table: Table,
    key: &Key,
    current: Option<Document>,
    attributes: Document,
) -> Document {
    let mut doc = current.unwrap_or_default();
    for (name, value) in attributes {
        doc.insert(name, value);
    }
    for (name, value) in table.key_document(key) {
        doc.insert(name, value);
    }
    doc
}

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

    #[test]
    fn test_key_of_single_and_composite() {
        let customer = doc(json!({"CustomerID": "c-1", "Name": "A"}));
        assert_eq!(
            Table::CustomerInformation.key_of(&customer).unwrap(),
            Key::single("c-1")
        );

        let stock = doc(json!({"ItemType": "Folio Paper", "VariationName": "Folio_6"}));
        assert_eq!(
            Table::RetailStock.key_of(&stock).unwrap(),
            Key::composite("Folio Paper", "Folio_6")
        );
    }

    #[test]
    fn test_key_of_rejects_missing_or_empty() {
        let stock = doc(json!({"ItemType": "Folio Paper"}));
        assert!(matches!(
            Table::WholesaleStock.key_of(&stock),
            Err(StoreError::InvalidKey { .. })
        ));

        let tx = doc(json!({"TransactionID": ""}));
        assert!(Table::TransactionRetail.key_of(&tx).is_err());
    }

    #[test]
    fn test_check_key_shape() {
        assert!(Table::RetailStock.check_key(&Key::single("x")).is_err());
        assert!(Table::CustomerInformation.check_key(&Key::single("x")).is_ok());
    }

    #[test]
    fn test_composite_encoding_has_no_collisions() {
        let a = Key::composite("a-b", "c");
        let b = Key::composite("a", "b-c");
        assert_ne!(a.encode(), b.encode());
        assert_eq!(a.encode(), r#"["a-b","c"]"#);
    }

    #[test]
    fn test_apply_patch_keeps_key_attributes() {
        let key = Key::composite("Folio Paper", "Folio_6");
        let patched = apply_patch(
            Table::RetailStock,
            &key,
            None,
            doc(json!({"Quantity_pcs": 3, "ItemType": "spoofed"})),
        );
        assert_eq!(patched["ItemType"], json!("Folio Paper"));
        assert_eq!(patched["VariationName"], json!("Folio_6"));
        assert_eq!(patched["Quantity_pcs"], json!(3));
    }
}
