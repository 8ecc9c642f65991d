//! # Validation Module
//!
//! Input validation for the write path.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Form (browser)                                               │
//! │  └── Required fields, numeric inputs                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Command (Rust)                                               │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Document store                                               │
//! │  └── Key attributes only; everything else is schemaless                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads are never validated: stored records are read leniently.
//!
//! ## Usage
//! ```rust
//! use stockbook_core::validation::{validate_quantity, validate_required};
//!
//! validate_required("ItemType", "Folio Paper").unwrap();
//! assert!(validate_quantity(-1).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::stock::StockRequest;
use crate::types::{Customer, TransactionInput};
use crate::{MAX_QUANTITY, MAX_TEXT_LENGTH, MAX_UNIT_PRICE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a required text field.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most [`MAX_TEXT_LENGTH`] characters
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > MAX_TEXT_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LENGTH,
        });
    }

    Ok(())
}

/// Validates a stock quantity: `0..=MAX_QUANTITY`.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    validate_count("quantity", qty)
}

/// Validates a transaction quantity: `1..=MAX_QUANTITY`.
pub fn validate_sale_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    validate_count("quantity", qty)
}

/// Validates a per-unit price: `0..=MAX_UNIT_PRICE`.
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if price > MAX_UNIT_PRICE {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: MAX_UNIT_PRICE.to_string(),
        });
    }
    Ok(())
}

fn validate_count(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if value > MAX_QUANTITY {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: MAX_QUANTITY.to_string(),
        });
    }
    Ok(())
}

/// Validates an optional email address.
///
/// ## Rules
/// - Blank is fine (email is optional)
/// - Otherwise must contain `@` with text on both sides
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_email;
///
/// assert!(validate_email(None).is_ok());
/// assert!(validate_email(Some("shop@example.com")).is_ok());
/// assert!(validate_email(Some("shop.example.com")).is_err());
/// ```
pub fn validate_email(email: Option<&str>) -> ValidationResult<()> {
    let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
        return Ok(());
    };

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "Email".to_string(),
            reason: "must be an email address".to_string(),
        }),
    }
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a customer before save.
///
/// Name and phone number are required; email is optional but must look
/// like an address when given.
pub fn validate_customer(customer: &Customer) -> ValidationResult<()> {
    validate_required("Name", &customer.name)?;
    validate_required("PhoneNumber", &customer.phone_number)?;
    validate_email(customer.email.as_deref())?;
    Ok(())
}

/// Validates a stock form.
pub fn validate_stock_request(request: &StockRequest) -> ValidationResult<()> {
    validate_required("ItemType", &request.item_type)?;
    validate_required("VariationName", &request.variation_name)?;
    validate_quantity(request.quantity)?;
    validate_count("LowStockThreshold", request.low_stock_threshold)?;
    if let Some(price) = request.unit_price {
        validate_price("UnitPrice", price)?;
    }
    Ok(())
}

/// Validates a transaction form.
pub fn validate_transaction_input(input: &TransactionInput) -> ValidationResult<()> {
    validate_required("CustomerID", &input.customer_id)?;
    validate_required("Date", &input.date)?;
    validate_required("ProductName", &input.product_name)?;
    validate_required("ProductVariation", &input.product_variation)?;
    validate_sale_quantity(input.quantity)?;
    validate_price("SellingPrice", input.selling_price)?;
    validate_price("COGS", input.cogs)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
