use std::collections::BTreeMap;

use crate::persist::record::MasterRecord;
use crate::pipeline::sort_ranked;
use crate::types::PersistMode;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeStats {
    /// Batch identities not previously persisted.
    pub added: usize,
    /// Batch identities that replaced a persisted record.
    pub updated: usize,
    /// Persisted identities absent from the batch and kept as-is.
    pub retained: usize,
}

/// Reconciles a new batch with the persisted set.
///
/// Merge is last-write-wins per item name: batch records replace persisted
/// ones, persisted-only records survive untouched. Overwrite drops the
/// persisted set entirely. The result is in report order either way.
pub fn merge(
    persisted: Vec<MasterRecord>,
    batch: Vec<MasterRecord>,
    mode: PersistMode,
) -> (Vec<MasterRecord>, MergeStats) {
    let mut stats = MergeStats::default();
    let mut by_name: BTreeMap<String, MasterRecord> = BTreeMap::new();

    if mode == PersistMode::Merge {
        for rec in persisted {
            by_name.insert(rec.name.clone(), rec);
        }
        stats.retained = by_name.len();
    }

    for rec in batch {
        match by_name.insert(rec.name.clone(), rec) {
            Some(_) if mode == PersistMode::Merge => {
                stats.updated += 1;
                stats.retained = stats.retained.saturating_sub(1);
            }
            Some(_) => {}
            None => stats.added += 1,
        }
    }

    let mut records: Vec<MasterRecord> = by_name.into_values().collect();
    sort_ranked(&mut records);
    (records, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Currency;
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;

    fn rec(name: &str, score: f64, stamp: &str) -> MasterRecord {
        MasterRecord {
            name: name.to_string(),
            skinport_url: String::new(),
            steam_url: String::new(),
            price: Decimal::ONE,
            currency: Currency::Usd,
            sales_this_week: Some(1),
            avg_7d: Some(1.0),
            avg_24h: None,
            avg_30d: None,
            growth_medium: None,
            growth_short: None,
            bullish_score: score,
            last_updated: DateTime::parse_from_rfc3339(stamp).unwrap().with_timezone(&Utc),
        }
    }

    const OLD: &str = "2026-10-18T00:00:00Z";
    const NEW: &str = "2026-10-19T00:00:00Z";

    #[test]
    fn batch_wins_and_persisted_only_survives() {
        let persisted = vec![rec("A", 1.0, OLD), rec("B", 1.0, OLD)];
        let batch = vec![rec("B", 5.0, NEW), rec("C", 2.0, NEW)];

        let (out, stats) = merge(persisted, batch, PersistMode::Merge);
        let names: Vec<&str> = out.iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names, vec!["B", "C", "A"]);
        assert_eq!(out[0].bullish_score, 5.0);
        assert_eq!(out[0].last_updated, rec("x", 0.0, NEW).last_updated);
        assert_eq!(out[2].last_updated, rec("x", 0.0, OLD).last_updated);
        assert_eq!(stats, MergeStats { added: 1, updated: 1, retained: 1 });
    }

    #[test]
    fn merging_the_same_batch_twice_is_idempotent() {
        let batch = vec![rec("A", 3.0, NEW), rec("B", 2.0, NEW)];
        let (once, _) = merge(Vec::new(), batch.clone(), PersistMode::Merge);
        let (twice, stats) = merge(once.clone(), batch, PersistMode::Merge);

        assert_eq!(once, twice);
        assert_eq!(stats.added, 0);
        assert_eq!(stats.updated, 2);
    }

    #[test]
    fn overwrite_discards_persisted() {
        let persisted = vec![rec("A", 9.0, OLD)];
        let (out, stats) = merge(persisted, vec![rec("B", 1.0, NEW)], PersistMode::Overwrite);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "B");
        assert_eq!(stats, MergeStats { added: 1, updated: 0, retained: 0 });
    }

    #[test]
    fn empty_batch_in_merge_mode_keeps_everything() {
        let persisted = vec![rec("A", 1.0, OLD), rec("B", 2.0, OLD)];
        let (out, stats) = merge(persisted, Vec::new(), PersistMode::Merge);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "B");
        assert_eq!(stats.retained, 2);
    }
}
