//! # Domain Types
//!
//! Core domain types used throughout Stockbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │   StockItem     │   │  Transaction    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  CustomerID     │   │  channel        │   │  TransactionID  │       │
//! │  │  Name           │   │  ItemType    ┐  │   │  CustomerID ┄┄┄┼┄┄ unchecked
//! │  │  CustomerType   │   │  Variation   ┘key│   │  channel        │       │
//! │  │  PhoneNumber    │   │  quantity       │   │  net_profit     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    Channel      │   │  CustomerType   │                             │
//! │  │  Retail  (pcs)  │   │  Retail         │                             │
//! │  │  Wholesale(pkt) │   │  Wholesale      │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stored Attribute Names
//! Stored documents keep the attribute names the tables were created with
//! (`CustomerID`, `Quantity_pcs`, `SellingPrice_Per_Packet`, ...). The
//! [`Channel`] type is the single place that knows which name belongs to
//! which channel.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::document::{self, Document};
use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Channel
// =============================================================================

/// Sales channel: determines the unit of quantity and the profit formula.
///
/// ```text
/// Retail     quantity in pieces   (1 unit = 1 piece)
/// Wholesale  quantity in packets  (1 unit = 20 pieces for COGS/valuation)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Channel {
    Retail,
    Wholesale,
}

impl Channel {
    /// Both channels, in report processing order.
    pub const ALL: [Channel; 2] = [Channel::Retail, Channel::Wholesale];

    /// Lowercase name used in transaction ids (`retail-1704067200000-a1b2c3d4`).
    pub fn slug(&self) -> &'static str {
        match self {
            Channel::Retail => "retail",
            Channel::Wholesale => "wholesale",
        }
    }

    /// Quantity attribute in the stock tables.
    pub fn stock_quantity_field(&self) -> &'static str {
        match self {
            Channel::Retail => "Quantity_pcs",
            Channel::Wholesale => "Quantity_packets",
        }
    }

    /// Quantity attribute in the transaction tables.
    pub fn transaction_quantity_field(&self) -> &'static str {
        match self {
            Channel::Retail => "Quantity_Pcs",
            Channel::Wholesale => "Quantity_Packets",
        }
    }

    /// Per-unit selling price attribute in the transaction tables.
    pub fn selling_price_field(&self) -> &'static str {
        match self {
            Channel::Retail => "SellingPrice_Per_Pc",
            Channel::Wholesale => "SellingPrice_Per_Packet",
        }
    }

    /// Per-unit COGS attribute in the transaction tables.
    pub fn cogs_field(&self) -> &'static str {
        match self {
            Channel::Retail => "COGS_Per_Pc",
            Channel::Wholesale => "COGS_Per_Packet",
        }
    }

    /// Human label for the unit of quantity.
    pub fn unit_label(&self) -> &'static str {
        match self {
            Channel::Retail => "pcs",
            Channel::Wholesale => "packets",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Retail => write!(f, "Retail"),
            Channel::Wholesale => write!(f, "Wholesale"),
        }
    }
}

impl FromStr for Channel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retail" => Ok(Channel::Retail),
            "wholesale" => Ok(Channel::Wholesale),
            other => Err(CoreError::UnknownChannel(other.to_string())),
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// Whether a customer buys retail or wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CustomerType {
    #[default]
    Retail,
    Wholesale,
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomerType::Retail => write!(f, "Retail"),
            CustomerType::Wholesale => write!(f, "Wholesale"),
        }
    }
}

impl FromStr for CustomerType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retail" => Ok(CustomerType::Retail),
            "wholesale" => Ok(CustomerType::Wholesale),
            other => Err(CoreError::UnknownCustomerType(other.to_string())),
        }
    }
}

/// Placeholder stored in `Email` when a customer has none.
pub const NO_EMAIL: &str = "-";

/// A customer record in `Customer_Information`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "PascalCase")]
pub struct Customer {
    /// Opaque unique id (UUID v4 for records created here).
    #[serde(rename = "CustomerID")]
    pub customer_id: String,

    pub name: String,

    /// Free-text postal address.
    pub address: String,

    pub customer_type: CustomerType,

    pub email: Option<String>,

    pub phone_number: String,
}

impl Customer {
    /// Reads a stored customer. Missing fields become empty strings, the
    /// [`NO_EMAIL`] placeholder reads as no email and an unknown
    /// `CustomerType` reads as retail.
    pub fn from_document(doc: &Document) -> Self {
        Customer {
            customer_id: document::text(doc, "CustomerID"),
            name: document::text(doc, "Name"),
            address: document::text(doc, "Address"),
            customer_type: document::text(doc, "CustomerType")
                .parse()
                .unwrap_or_default(),
            email: document::optional_text(doc, "Email").filter(|e| e != NO_EMAIL),
            phone_number: document::text(doc, "PhoneNumber"),
        }
    }

    /// Renders the customer as a stored document.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("CustomerID".into(), Value::from(self.customer_id.as_str()));
        doc.insert("Name".into(), Value::from(self.name.as_str()));
        doc.insert("Address".into(), Value::from(self.address.as_str()));
        doc.insert(
            "CustomerType".into(),
            Value::from(self.customer_type.to_string()),
        );
        doc.insert(
            "Email".into(),
            Value::from(self.email.as_deref().unwrap_or(NO_EMAIL)),
        );
        doc.insert("PhoneNumber".into(), Value::from(self.phone_number.as_str()));
        doc
    }
}

// =============================================================================
// Stock
// =============================================================================

/// Composite key of a stock row within one channel table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockKey {
    pub item_type: String,
    pub variation_name: String,
}

impl StockKey {
    pub fn new(item_type: impl Into<String>, variation_name: impl Into<String>) -> Self {
        StockKey {
            item_type: item_type.into(),
            variation_name: variation_name.into(),
        }
    }
}

impl fmt::Display for StockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.item_type, self.variation_name)
    }
}

/// One stock row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub channel: Channel,
    pub item_type: String,
    pub variation_name: String,
    /// Pieces for retail, packets for wholesale.
    pub quantity: i64,
    pub unit_price: Money,
    pub low_stock_threshold: i64,
}

impl StockItem {
    pub fn key(&self) -> StockKey {
        StockKey::new(self.item_type.as_str(), self.variation_name.as_str())
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A sales transaction in canonical (channel-independent) shape.
///
/// Produced by the normalizer from either transaction table; all report code
/// works against this type only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: String,
    pub channel: Channel,
    pub customer_id: String,
    /// Date as stored; parsed leniently by the report aggregator.
    pub date: String,
    pub time: String,
    /// Product category (e.g. "Non-judicial stamp").
    pub product_name: String,
    pub product_variation: String,
    /// Pieces for retail, packets for wholesale.
    pub quantity: i64,
    /// Per-unit selling price.
    pub selling_price: Money,
    /// Per-unit cost of goods sold (per piece, also for wholesale).
    pub cogs: Money,
    /// Stored at write time, never recomputed on read.
    pub net_profit: Money,
}

/// Form input for recording or replacing a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    pub customer_id: String,
    pub date: String,
    pub time: String,
    pub product_name: String,
    pub product_variation: String,
    pub quantity: i64,
    pub selling_price: Money,
    pub cogs: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================
