//! # Money/Quantity Conventions
//!
//! The business rules that turn quantities and prices into value and profit.
//!
//! ## Units
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Retail     1 unit = 1 piece                                            │
//! │  Wholesale  1 unit = 1 packet = 20 pieces                               │
//! │                                                                         │
//! │  Stock value                                                            │
//! │    retail     unit_price × quantity                                     │
//! │    wholesale  unit_price × quantity × 20                                │
//! │                                                                         │
//! │  Net profit (computed once, when a transaction is written)              │
//! │    retail     quantity × selling_price − cogs × quantity                │
//! │    wholesale  quantity × selling_price − cogs × 20 × quantity           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Price From Variation Name
//! Stock variations are named after their price: `"100-90"` sells at 90,
//! `"Folio_6"` at 6. [`extract_price`] is the only place that reads this
//! convention, so it can be swapped for an explicit price field without
//! touching callers.

use crate::money::Money;
use crate::types::Channel;
use crate::PIECES_PER_PACKET;

/// Number of pieces a single unit of `channel` stands for.
pub fn pieces_per_unit(channel: Channel) -> i64 {
    match channel {
        Channel::Retail => 1,
        Channel::Wholesale => PIECES_PER_PACKET,
    }
}

/// Infers a unit price from a variation name.
///
/// | Input            | Rule                        | Result |
/// |------------------|-----------------------------|--------|
/// | `"100-90"`       | number after the hyphen     | 90     |
/// | `"100-90-80"`    | second hyphen segment       | 90     |
/// | `"Pen-12.5"`     | decimals are kept           | 12.50  |
/// | `"Folio_6"`      | number after the underscore | 6      |
/// | `"Ream500"`      | trailing digits             | 500    |
/// | `"NoNumbersHere"`| none                        | `None` |
/// | `"Pack-large"`   | non-numeric after separator | `None` |
///
/// ## Example
/// ```rust
/// use stockbook_core::conventions::extract_price;
/// use stockbook_core::money::Money;
///
/// assert_eq!(extract_price("100-90"), Some(Money::from_units(90)));
/// assert_eq!(extract_price("NoNumbersHere"), None);
/// ```
pub fn extract_price(variation: &str) -> Option<Money> {
    let candidate = if variation.contains('-') {
        variation.split('-').nth(1)?
    } else if variation.contains('_') {
        variation.split('_').nth(1)?
    } else {
        let digits_start = variation
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map(|(i, _)| i)?;
        &variation[digits_start..]
    };

    let candidate = candidate.trim();
    let is_number = candidate.chars().any(|c| c.is_ascii_digit())
        && candidate.chars().all(|c| c.is_ascii_digit() || c == '.')
        && candidate.matches('.').count() <= 1;
    if !is_number {
        return None;
    }
    Money::parse_decimal(candidate)
}

/// Stock valuation: `unit_price × quantity`, times 20 for wholesale.
///
/// Saturates instead of overflowing on malformed stored values.
pub fn total_value(channel: Channel, unit_price: Money, quantity: i64) -> Money {
    unit_price.multiply_quantity(quantity.saturating_mul(pieces_per_unit(channel)))
}

/// Revenue of one transaction line: `quantity × selling_price`, saturating.
pub fn revenue(quantity: i64, selling_price: Money) -> Money {
    selling_price.multiply_quantity(quantity)
}

/// Net profit of one transaction line.
///
/// COGS is always a per-piece cost, so wholesale lines multiply it by the
/// packet size. Returns `None` when the result does not fit.
///
/// ## Example
/// ```rust
/// use stockbook_core::conventions::net_profit;
/// use stockbook_core::money::Money;
/// use stockbook_core::types::Channel;
///
/// let profit = net_profit(Channel::Wholesale, 3, Money::from_units(500), Money::from_units(16));
/// assert_eq!(profit.unwrap().to_string(), "540.00");
/// ```
pub fn net_profit(
    channel: Channel,
    quantity: i64,
    selling_price: Money,
    cogs: Money,
) -> Option<Money> {
    let revenue = selling_price.checked_multiply_quantity(quantity)?;
    let pieces = quantity.checked_mul(pieces_per_unit(channel))?;
    let cost = cogs.checked_multiply_quantity(pieces)?;
    revenue.checked_sub(cost)
}
