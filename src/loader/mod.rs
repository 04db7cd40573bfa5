//! Normalization of raw Skinport payloads into per-item records.

pub mod catalog;
pub mod history;

use rust_decimal::Decimal;
use serde_json::Value;

pub use catalog::{load_catalog, Catalog};
pub use history::{load_history, History};

/// Numbers arrive either as JSON numbers or numeric strings.
pub(crate) fn value_as_f64(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        .filter(|x: &f64| x.is_finite())
}

pub(crate) fn value_as_i64(v: &Value) -> Option<i64> {
    v.as_i64()
        .or_else(|| v.as_f64().filter(|x| x.is_finite()).map(|x| x.round() as i64))
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

/// Parses through the number's textual form so `12.34` stays exactly 12.34.
pub(crate) fn value_as_decimal(v: &Value) -> Option<Decimal> {
    match v {
        Value::Number(n) => {
            let text = n.to_string();
            text.parse::<Decimal>()
                .ok()
                .or_else(|| Decimal::from_scientific(&text).ok())
        }
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
