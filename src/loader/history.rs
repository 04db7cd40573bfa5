use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use super::{value_as_f64, value_as_i64};
use crate::types::SalesAggregate;

/// identity → sales aggregates
pub type History = BTreeMap<String, SalesAggregate>;

#[derive(Debug, Default)]
pub struct HistoryStats {
    pub raw_total: usize,
    pub rejected_no_name: usize,
    pub duplicates: usize,
}

/// Normalizes the `/sales/history` payload. Window objects and the fields
/// inside them are all optional; absence is kept as `None`.
pub fn load_history(raw: &[Value]) -> (History, HistoryStats) {
    let mut history = History::new();
    let mut stats = HistoryStats {
        raw_total: raw.len(),
        ..Default::default()
    };

    for entry in raw {
        let Some(name) = entry
            .get("market_hash_name")
            .and_then(|n| n.as_str())
            .map(str::trim)
            .filter(|n| !n.is_empty())
        else {
            stats.rejected_no_name += 1;
            continue;
        };

        let last_24h = entry.get("last_24_hours");
        let last_7d = entry.get("last_7_days");
        let last_30d = entry.get("last_30_days");

        let aggregate = SalesAggregate {
            name: name.to_string(),
            avg_24h: window_field(last_24h, "avg").and_then(value_as_f64),
            volume_24h: window_field(last_24h, "volume").and_then(value_as_i64),
            avg_7d: window_field(last_7d, "avg").and_then(value_as_f64),
            volume_7d: window_field(last_7d, "volume").and_then(value_as_i64),
            avg_30d: window_field(last_30d, "avg").and_then(value_as_f64),
        };
        if history.insert(aggregate.name.clone(), aggregate).is_some() {
            stats.duplicates += 1;
        }
    }

    if stats.duplicates > 0 {
        warn!("Sales history payload repeated {} item names; last entry kept", stats.duplicates);
    }
    (history, stats)
}

fn window_field<'a>(window: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    window.filter(|w| w.is_object())?.get(key)
}
