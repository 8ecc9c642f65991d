//! # Stored Documents
//!
//! Records come back from the document store as schemaless JSON objects.
//! Field types are whatever the writer happened to use: quantities may be
//! numbers or strings, prices may be `46.5` or `"46.50"`, some fields may be
//! missing entirely.
//!
//! The readers in this module coerce those shapes into typed values and
//! never fail: a missing or unreadable field becomes the empty string, zero,
//! or the supplied default.
//!
//! ```text
//! {"Quantity_Pcs": "2"}   ──integer──►  2
//! {"Quantity_Pcs": 2.0}   ──integer──►  2
//! {"Quantity_Pcs": null}  ──integer──►  0
//! {"NetProfit": "12.50"}  ──money────►  Money(1250)
//! {"NetProfit": true}     ──money────►  Money(0)
//! {"Quantity_Pcs": "1e18"}──integer──►  0   (beyond MAX_STORED_INTEGER)
//! ```

use serde_json::{Map, Value};

use crate::money::Money;
use crate::MAX_STORED_INTEGER;

/// A schemaless stored record.
pub type Document = Map<String, Value>;

/// Reads a field as text.
///
/// Numbers and booleans are rendered; null, arrays and objects become `""`.
pub fn text(doc: &Document, key: &str) -> String {
    match doc.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Reads a field as text, treating missing and blank values as `None`.
pub fn optional_text(doc: &Document, key: &str) -> Option<String> {
    let value = text(doc, key);
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Reads a field as an integer, defaulting to zero.
pub fn integer(doc: &Document, key: &str) -> i64 {
    integer_or(doc, key, 0)
}

/// Reads a field as an integer.
///
/// `default` applies only when the field is absent or null; a present but
/// unparsable value, or one beyond [`MAX_STORED_INTEGER`], reads as zero.
pub fn integer_or(doc: &Document, key: &str, default: i64) -> i64 {
    let value = match doc.get(key) {
        None | Some(Value::Null) => default,
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => parse_integer(s).unwrap_or(0),
        Some(_) => 0,
    };
    if (-MAX_STORED_INTEGER..=MAX_STORED_INTEGER).contains(&value) {
        value
    } else {
        0
    }
}

/// Reads a field as money, defaulting to zero.
pub fn money(doc: &Document, key: &str) -> Money {
    match doc.get(key) {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(units) => Money::checked_from_units(units).unwrap_or_default(),
            None => n.as_f64().and_then(Money::from_f64).unwrap_or_default(),
        },
        Some(Value::String(s)) => Money::parse_decimal(s).unwrap_or_default(),
        _ => Money::zero(),
    }
}

/// Returns true when the field is present and not null.
pub fn has(doc: &Document, key: &str) -> bool {
    !matches!(doc.get(key), None | Some(Value::Null))
}

fn parse_integer(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    })
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
    fn test_text_coercion() {
        let d = doc(json!({"a": "x", "b": 7, "c": null, "d": [1]}));
        assert_eq!(text(&d, "a"), "x");
        assert_eq!(text(&d, "b"), "7");
        assert_eq!(text(&d, "c"), "");
        assert_eq!(text(&d, "d"), "");
        assert_eq!(text(&d, "missing"), "");
        assert_eq!(optional_text(&d, "c"), None);
    }

    #[test]
    fn test_integer_coercion() {
        let d = doc(json!({"n": 5, "f": 2.9, "s": " 12 ", "fs": "3.7", "bad": "lots", "null": null}));
        assert_eq!(integer(&d, "n"), 5);
        assert_eq!(integer(&d, "f"), 2);
        assert_eq!(integer(&d, "s"), 12);
        assert_eq!(integer(&d, "fs"), 3);
        assert_eq!(integer(&d, "bad"), 0);
        assert_eq!(integer_or(&d, "null", 10), 10);
        assert_eq!(integer_or(&d, "missing", 10), 10);
        assert_eq!(integer_or(&d, "bad", 10), 0);
    }

    #[test]
    fn test_money_coercion() {
        let d = doc(json!({"i": 90, "f": 46.5, "s": "540.00", "bad": "n/a", "b": true}));
        assert_eq!(money(&d, "i"), Money::from_units(90));
        assert_eq!(money(&d, "f"), Money::from_cents(4650));
        assert_eq!(money(&d, "s"), Money::from_cents(54000));
        assert_eq!(money(&d, "bad"), Money::zero());
        assert_eq!(money(&d, "b"), Money::zero());
        assert_eq!(money(&d, "missing"), Money::zero());
    }

    #[test]
    fn test_out_of_range_values_read_as_zero() {
        let d = doc(json!({
            "q": "1e18",
            "qn": i64::MIN,
            "p": 100000000000000000i64,
            "ps": "1e30",
        }));
        assert_eq!(integer(&d, "q"), 0);
        assert_eq!(integer_or(&d, "qn", 10), 0);
        assert_eq!(money(&d, "p"), Money::zero());
        assert_eq!(money(&d, "ps"), Money::zero());
    }
}
