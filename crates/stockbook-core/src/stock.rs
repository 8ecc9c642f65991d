//! # Stock Reconciler
//!
//! Derives the stock read model and plans stock writes.
//!
//! ## Read Path
//! ```text
//! Retail_Stock / Wholesale_Stock document
//!         │ StockItem::from_document
//!         ▼
//!     StockItem ──► StockView { id, is_low_stock, total_value }
//! ```
//! Pure: stored records are never touched on read.
//!
//! ## Write Path
//! The command layer fetches the edit's original record and the record at
//! the submitted key, then asks [`plan_stock_write`] what to do. The plan is
//! a list of steps the command layer executes in order.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request          original   target     steps                          │
//! │  ───────────────  ─────────  ─────────  ──────────────────────────────  │
//! │  add              -          absent     Put(new)                        │
//! │  add              -          present    Patch(qty += n)  + Merged       │
//! │  edit same key    present    present    Patch(qty = n)                  │
//! │  edit new key     present    absent     Delete(old), Put(new)           │
//! │  edit new key     present    present    Delete(old), Patch(qty = n)     │
//! │  edit             missing    absent     Put(new)         + Missing      │
//! │  edit             missing    present    Patch(qty = n)   + Missing      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Moves Are Two-Phase
//! Changing the key (or channel) of an item deletes the old record before
//! writing the new one. Between the two steps neither record exists. If the
//! second step fails the plan's `compensation` step restores the old record.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::conventions;
use crate::document::{self, Document};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Channel, StockItem, StockKey};
use crate::{DEFAULT_LOW_STOCK_THRESHOLD, MAX_QUANTITY};

// =============================================================================
// Documents
// =============================================================================

impl StockItem {
    /// Reads a document from the stock table of `channel`.
    ///
    /// Missing quantity and price read as zero; a missing threshold reads as
    /// [`DEFAULT_LOW_STOCK_THRESHOLD`].
    pub fn from_document(channel: Channel, doc: &Document) -> Self {
        StockItem {
            channel,
            item_type: document::text(doc, "ItemType"),
            variation_name: document::text(doc, "VariationName"),
            quantity: document::integer(doc, channel.stock_quantity_field()),
            unit_price: document::money(doc, "UnitPrice"),
            low_stock_threshold: document::integer_or(
                doc,
                "LowStockThreshold",
                DEFAULT_LOW_STOCK_THRESHOLD,
            ),
        }
    }

    /// Renders the item for its stock table. `UnitPrice` is omitted when zero.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("ItemType".into(), Value::from(self.item_type.as_str()));
        doc.insert(
            "VariationName".into(),
            Value::from(self.variation_name.as_str()),
        );
        doc.insert(
            self.channel.stock_quantity_field().into(),
            Value::from(self.quantity),
        );
        doc.insert(
            "LowStockThreshold".into(),
            Value::from(self.low_stock_threshold),
        );
        if self.unit_price.is_positive() {
            doc.insert("UnitPrice".into(), money_value(self.unit_price));
        }
        doc
    }

    /// `unit_price × quantity`, times 20 for wholesale.
    pub fn total_value(&self) -> Money {
        conventions::total_value(self.channel, self.unit_price, self.quantity)
    }

    /// Inclusive: an item exactly at its threshold is low.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }
}

/// Stores whole amounts as integers and fractional ones as floats.
fn money_value(amount: Money) -> Value {
    if amount.minor_part() == 0 {
        Value::from(amount.major())
    } else {
        Value::from(amount.as_f64())
    }
}

// =============================================================================
// Read Model
// =============================================================================

/// A stock row as shown on the stock page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockView {
    /// `"{ItemType}-{VariationName}"`
    pub id: String,
    #[serde(flatten)]
    pub item: StockItem,
    pub is_low_stock: bool,
    pub total_value: Money,
}

impl From<StockItem> for StockView {
    fn from(item: StockItem) -> Self {
        StockView {
            id: item.key().to_string(),
            is_low_stock: item.is_low_stock(),
            total_value: item.total_value(),
            item,
        }
    }
}

/// Reads every document of a stock table into views, keeping scan order.
pub fn stock_views(channel: Channel, docs: &[Document]) -> Vec<StockView> {
    docs.iter()
        .map(|doc| StockView::from(StockItem::from_document(channel, doc)))
        .collect()
}

// =============================================================================
// Write Planning
// =============================================================================

/// Identifies the record an edit started from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockLocation {
    pub channel: Channel,
    pub item_type: String,
    pub variation_name: String,
}

impl StockLocation {
    pub fn key(&self) -> StockKey {
        StockKey::new(self.item_type.as_str(), self.variation_name.as_str())
    }
}

/// A submitted stock form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockRequest {
    pub channel: Channel,
    pub item_type: String,
    pub variation_name: String,
    pub quantity: i64,
    pub low_stock_threshold: i64,
    /// Explicit unit price; when absent the price is inferred from the
    /// variation name for new items and left alone for existing ones.
    #[serde(default)]
    pub unit_price: Option<Money>,
    /// Set when editing an existing row.
    #[serde(default)]
    pub edit: Option<StockLocation>,
}

impl StockRequest {
    pub fn key(&self) -> StockKey {
        StockKey::new(self.item_type.as_str(), self.variation_name.as_str())
    }

    fn location(&self) -> StockLocation {
        StockLocation {
            channel: self.channel,
            item_type: self.item_type.clone(),
            variation_name: self.variation_name.clone(),
        }
    }

    /// The item a fresh put would write.
    fn new_item(&self) -> StockItem {
        let unit_price = self
            .unit_price
            .or_else(|| conventions::extract_price(&self.variation_name))
            .unwrap_or_default();
        StockItem {
            channel: self.channel,
            item_type: self.item_type.clone(),
            variation_name: self.variation_name.clone(),
            quantity: self.quantity,
            unit_price,
            low_stock_threshold: self.low_stock_threshold,
        }
    }
}

/// One store operation of a plan.
#[derive(Debug, Clone, PartialEq)]
pub enum StockStep {
    /// Delete the record at `location`.
    Delete(StockLocation),
    /// Write a full record, replacing whatever is there.
    Put(StockItem),
    /// Set quantity and threshold (and price, when given) on an existing
    /// record, leaving other attributes alone.
    Patch {
        location: StockLocation,
        quantity: i64,
        low_stock_threshold: i64,
        unit_price: Option<Money>,
    },
}

impl StockStep {
    /// Attributes a patch sets, under the stock table's names.
    pub fn patch_attributes(
        channel: Channel,
        quantity: i64,
        low_stock_threshold: i64,
        unit_price: Option<Money>,
    ) -> Document {
        let mut attrs = Document::new();
        attrs.insert(
            channel.stock_quantity_field().into(),
            Value::from(quantity),
        );
        attrs.insert("LowStockThreshold".into(), Value::from(low_stock_threshold));
        if let Some(price) = unit_price {
            attrs.insert("UnitPrice".into(), money_value(price));
        }
        attrs
    }
}

/// Something the user should be told about a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StockNotice {
    /// An add hit an existing key; the quantities were summed.
    MergedIntoExisting {
        #[serde(rename = "previousQuantity")]
        previous_quantity: i64,
        #[serde(rename = "newQuantity")]
        new_quantity: i64,
    },
    /// The record being edited no longer exists; it was created instead.
    OriginalMissing,
    /// The edit changed the key or channel; the record was moved.
    Moved { from: String, to: String },
}

impl StockNotice {
    pub fn message(&self) -> String {
        match self {
            StockNotice::MergedIntoExisting {
                previous_quantity,
                new_quantity,
            } => format!(
                "Item already exists; quantity increased from {previous_quantity} to {new_quantity}"
            ),
            StockNotice::OriginalMissing => {
                "Original item not found. Creating new item instead.".to_string()
            }
            StockNotice::Moved { from, to } => format!("Stock item moved from {from} to {to}"),
        }
    }
}

/// The ordered steps for one stock write.
#[derive(Debug, Clone, PartialEq)]
pub struct StockPlan {
    pub steps: Vec<StockStep>,
    pub notices: Vec<StockNotice>,
    /// Undoes the first step of a move if a later step fails.
    pub compensation: Option<StockStep>,
}

impl StockPlan {
    fn single(step: StockStep) -> Self {
        StockPlan {
            steps: vec![step],
            notices: Vec::new(),
            compensation: None,
        }
    }

    fn with_notice(mut self, notice: StockNotice) -> Self {
        self.notices.push(notice);
        self
    }

    /// True when the plan deletes one record and writes another.
    pub fn is_move(&self) -> bool {
        self.compensation.is_some()
    }
}

/// Writes the submitted quantity as an absolute value.
fn absolute_write(request: &StockRequest, target: Option<&StockItem>) -> StockStep {
    match target {
        Some(_) => StockStep::Patch {
            location: request.location(),
            quantity: request.quantity,
            low_stock_threshold: request.low_stock_threshold,
            unit_price: request.unit_price,
        },
        None => StockStep::Put(request.new_item()),
    }
}

/// Plans a stock write.
///
/// `original` is the current record at `request.edit` (None when the
/// request is an add, or the record is gone); `target` is the current
/// record at the submitted channel and key.
///
/// ## Example
/// ```rust
/// use stockbook_core::stock::{plan_stock_write, StockRequest, StockStep};
/// use stockbook_core::types::Channel;
///
/// let request = StockRequest {
///     channel: Channel::Wholesale,
///     item_type: "Folio Paper".into(),
///     variation_name: "Folio_6".into(),
///     quantity: 5,
///     low_stock_threshold: 10,
///     unit_price: None,
///     edit: None,
/// };
/// let plan = plan_stock_write(&request, None, None).unwrap();
/// assert!(matches!(&plan.steps[..], [StockStep::Put(item)] if item.unit_price.major() == 6));
/// ```
pub fn plan_stock_write(
    request: &StockRequest,
    original: Option<&StockItem>,
    target: Option<&StockItem>,
) -> CoreResult<StockPlan> {
    let Some(edit) = &request.edit else {
        return match target {
            Some(existing) => {
                let new_quantity = merged_quantity(existing.quantity, request.quantity)?;
                Ok(StockPlan::single(StockStep::Patch {
                    location: request.location(),
                    quantity: new_quantity,
                    low_stock_threshold: request.low_stock_threshold,
                    unit_price: request.unit_price,
                })
                .with_notice(StockNotice::MergedIntoExisting {
                    previous_quantity: existing.quantity,
                    new_quantity,
                }))
            }
            None => Ok(StockPlan::single(StockStep::Put(request.new_item()))),
        };
    };

    let Some(original) = original else {
        return Ok(StockPlan::single(absolute_write(request, target))
            .with_notice(StockNotice::OriginalMissing));
    };

    let moved = edit.channel != request.channel || edit.key() != request.key();
    if !moved {
        return Ok(StockPlan::single(absolute_write(request, Some(original))));
    }

    Ok(StockPlan {
        steps: vec![
            StockStep::Delete(edit.clone()),
            absolute_write(request, target),
        ],
        notices: vec![StockNotice::Moved {
            from: format!("{} {}", edit.channel, edit.key()),
            to: format!("{} {}", request.channel, request.key()),
        }],
        compensation: Some(StockStep::Put(original.clone())),
    })
}

/// Sum of a stored and an added quantity, capped at [`MAX_QUANTITY`].
fn merged_quantity(existing: i64, added: i64) -> CoreResult<i64> {
    existing
        .checked_add(added)
        .filter(|total| *total <= MAX_QUANTITY)
        .ok_or(CoreError::QuantityOverflow {
            existing,
            added,
            max: MAX_QUANTITY,
        })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

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

    fn request(channel: Channel, variation: &str, qty: i64) -> StockRequest {
        StockRequest {
            channel,
            item_type: "Non-judicial stamp".into(),
            variation_name: variation.into(),
            quantity: qty,
            low_stock_threshold: 15,
            unit_price: None,
            edit: None,
        }
    }

    fn edit_of(channel: Channel, variation: &str) -> Option<StockLocation> {
        Some(StockLocation {
            channel,
            item_type: "Non-judicial stamp".into(),
            variation_name: variation.into(),
        })
    }

    #[test]
    fn test_total_value_per_channel() {
        let folio = StockItem {
            item_type: "Folio Paper".into(),
            ..item(Channel::Wholesale, "Folio_6", 5, 6)
        };
        assert_eq!(folio.total_value(), Money::from_units(600));
        assert_eq!(item(Channel::Retail, "Folio_6", 5, 6).total_value(), Money::from_units(30));
    }

    #[test]
    fn test_low_stock_boundary_is_inclusive() {
        assert!(item(Channel::Retail, "a", 5, 1).is_low_stock());
        assert!(item(Channel::Retail, "a", 10, 1).is_low_stock());
        assert!(!item(Channel::Retail, "a", 11, 1).is_low_stock());
    }

    #[test]
    fn test_view_from_document_defaults() {
        let doc = json!({"ItemType": "Folio Paper", "VariationName": "Folio_6", "Quantity_packets": 5});
        let views = stock_views(Channel::Wholesale, &[doc.as_object().unwrap().clone()]);
        let view = &views[0];
        assert_eq!(view.id, "Folio Paper-Folio_6");
        assert_eq!(view.item.unit_price, Money::zero());
        assert_eq!(view.item.low_stock_threshold, 10);
        assert!(view.is_low_stock);
        assert_eq!(view.total_value, Money::zero());
    }

    #[test]
    fn test_retail_reads_piece_quantity() {
        let doc = json!({"ItemType": "A", "VariationName": "B", "Quantity_pcs": "7", "Quantity_packets": 99, "UnitPrice": 46});
        let item = StockItem::from_document(Channel::Retail, doc.as_object().unwrap());
        assert_eq!(item.quantity, 7);
        assert_eq!(item.total_value(), Money::from_units(322));
    }

    #[test]
    fn test_to_document_omits_zero_price() {
        let doc = item(Channel::Retail, "x", 3, 0).to_document();
        assert!(!doc.contains_key("UnitPrice"));
        assert_eq!(doc["Quantity_pcs"], json!(3));

        let doc = item(Channel::Wholesale, "100-90", 3, 90).to_document();
        assert_eq!(doc["UnitPrice"], json!(90));
        assert_eq!(doc["Quantity_packets"], json!(3));
    }

    #[test]
    fn test_add_new_item_infers_price() {
        let plan = plan_stock_write(&request(Channel::Retail, "100-90", 4), None, None).unwrap();
        assert_eq!(plan.steps.len(), 1);
        match &plan.steps[0] {
            StockStep::Put(item) => {
                assert_eq!(item.unit_price, Money::from_units(90));
                assert_eq!(item.quantity, 4);
                assert_eq!(item.low_stock_threshold, 15);
            }
            other => panic!("expected put, got {other:?}"),
        }
        assert!(plan.notices.is_empty());
    }

    #[test]
    fn test_add_explicit_price_wins() {
        let mut req = request(Channel::Retail, "100-90", 4);
        req.unit_price = Some(Money::from_units(95));
        let plan = plan_stock_write(&req, None, None).unwrap();
        assert!(matches!(&plan.steps[0], StockStep::Put(item) if item.unit_price == Money::from_units(95)));
    }

    #[test]
    fn test_add_existing_key_merges_quantity() {
        let existing = item(Channel::Retail, "100-90", 6, 90);
        let plan = plan_stock_write(&request(Channel::Retail, "100-90", 4), None, Some(&existing)).unwrap();

        assert_eq!(
            plan.steps,
            vec![StockStep::Patch {
                location: StockLocation {
                    channel: Channel::Retail,
                    item_type: "Non-judicial stamp".into(),
                    variation_name: "100-90".into(),
                },
                quantity: 10,
                low_stock_threshold: 15,
                unit_price: None,
            }]
        );
        assert_eq!(
            plan.notices,
            vec![StockNotice::MergedIntoExisting {
                previous_quantity: 6,
                new_quantity: 10
            }]
        );
    }

    #[test]
    fn test_merge_past_max_quantity_is_refused() {
        let existing = item(Channel::Retail, "100-90", MAX_QUANTITY - 1, 90);
        let err = plan_stock_write(&request(Channel::Retail, "100-90", 2), None, Some(&existing))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::QuantityOverflow { existing: e, added: 2, max: MAX_QUANTITY } if e == MAX_QUANTITY - 1
        ));

        let existing = item(Channel::Retail, "100-90", i64::MAX, 90);
        assert!(plan_stock_write(&request(Channel::Retail, "100-90", 1), None, Some(&existing)).is_err());

        let existing = item(Channel::Retail, "100-90", MAX_QUANTITY - 4, 90);
        let plan = plan_stock_write(&request(Channel::Retail, "100-90", 4), None, Some(&existing)).unwrap();
        assert!(matches!(&plan.steps[..], [StockStep::Patch { quantity: MAX_QUANTITY, .. }]));
    }

    #[test]
    fn test_edit_same_key_sets_absolute_quantity() {
        let existing = item(Channel::Retail, "100-90", 6, 90);
        let mut req = request(Channel::Retail, "100-90", 2);
        req.edit = edit_of(Channel::Retail, "100-90");

        let plan = plan_stock_write(&req, Some(&existing), Some(&existing)).unwrap();

        assert!(!plan.is_move());
        assert!(plan.notices.is_empty());
        assert!(matches!(
            &plan.steps[..],
            [StockStep::Patch { quantity: 2, unit_price: None, .. }]
        ));
    }

    #[test]
    fn test_edit_changed_key_moves_record() {
        let existing = item(Channel::Retail, "100-90", 6, 90);
        let mut req = request(Channel::Retail, "50-46", 3);
        req.edit = edit_of(Channel::Retail, "100-90");

        let plan = plan_stock_write(&req, Some(&existing), None).unwrap();

        assert!(plan.is_move());
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(
            plan.steps[0],
            StockStep::Delete(StockLocation {
                channel: Channel::Retail,
                item_type: "Non-judicial stamp".into(),
                variation_name: "100-90".into(),
            })
        );
        assert!(matches!(
            &plan.steps[1],
            StockStep::Put(item) if item.quantity == 3 && item.unit_price == Money::from_units(46)
        ));
        assert_eq!(plan.compensation, Some(StockStep::Put(existing)));
    }

    #[test]
    fn test_edit_changed_channel_deletes_from_original_table() {
        let existing = item(Channel::Retail, "100-90", 6, 90);
        let mut req = request(Channel::Wholesale, "100-90", 1);
        req.edit = edit_of(Channel::Retail, "100-90");

        let plan = plan_stock_write(&req, Some(&existing), None).unwrap();

        assert!(matches!(&plan.steps[0], StockStep::Delete(loc) if loc.channel == Channel::Retail));
        assert!(matches!(&plan.steps[1], StockStep::Put(item) if item.channel == Channel::Wholesale));
    }

    #[test]
    fn test_edit_onto_existing_key_overwrites_quantity() {
        let existing = item(Channel::Retail, "100-90", 6, 90);
        let occupied = item(Channel::Retail, "50-46", 40, 46);
        let mut req = request(Channel::Retail, "50-46", 3);
        req.edit = edit_of(Channel::Retail, "100-90");

        let plan = plan_stock_write(&req, Some(&existing), Some(&occupied)).unwrap();

        assert!(matches!(&plan.steps[1], StockStep::Patch { quantity: 3, .. }));
    }

    #[test]
    fn test_edit_with_missing_original_creates() {
        let mut req = request(Channel::Retail, "100-90", 3);
        req.edit = edit_of(Channel::Retail, "100-90");

        let plan = plan_stock_write(&req, None, None).unwrap();

        assert_eq!(plan.notices, vec![StockNotice::OriginalMissing]);
        assert!(matches!(&plan.steps[..], [StockStep::Put(_)]));
        assert_eq!(
            plan.notices[0].message(),
            "Original item not found. Creating new item instead."
        );
    }

    #[test]
    fn test_patch_attributes_use_channel_field() {
        let attrs = StockStep::patch_attributes(Channel::Wholesale, 4, 10, Some(Money::from_cents(650)));
        assert_eq!(attrs["Quantity_packets"], json!(4));
        assert_eq!(attrs["LowStockThreshold"], json!(10));
        assert_eq!(attrs["UnitPrice"], json!(6.5));
    }
}
