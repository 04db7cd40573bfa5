use crate::loader::{Catalog, History};
use crate::types::JoinedRecord;

/// Inner join of catalog and history on item name.
///
/// Names present on only one side are dropped silently: the two endpoints are
/// refreshed independently and never agree exactly. Output is in name order.
pub fn join(catalog: &Catalog, history: &History) -> Vec<JoinedRecord> {
    catalog
        .iter()
        .filter_map(|(name, listing)| {
            history.get(name).map(|sales| JoinedRecord {
                listing: listing.clone(),
                sales: sales.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Currency, ListingRecord, SalesAggregate};
    use rust_decimal::Decimal;

    fn listing(name: &str) -> ListingRecord {
        ListingRecord {
            name: name.to_string(),
            price: Decimal::ONE,
            currency: Currency::Usd,
            market_url: String::new(),
            steam_url: String::new(),
        }
    }

    fn sales(name: &str, avg_7d: f64) -> SalesAggregate {
        SalesAggregate {
            name: name.to_string(),
            avg_7d: Some(avg_7d),
            ..Default::default()
        }
    }

    #[test]
    fn keeps_only_names_on_both_sides() {
        let catalog: Catalog = ["A", "B", "C"]
            .into_iter()
            .map(|n| (n.to_string(), listing(n)))
            .collect();
        let history: History = [("B", 2.0), ("C", 3.0), ("D", 4.0)]
            .into_iter()
            .map(|(n, a)| (n.to_string(), sales(n, a)))
            .collect();

        let joined = join(&catalog, &history);
        let names: Vec<&str> = joined.iter().map(|j| j.name()).collect();

        assert_eq!(names, vec!["B", "C"]);
        assert!(joined.len() <= catalog.len().min(history.len()));
        assert_eq!(joined[1].sales.avg_7d, Some(3.0));
    }

    #[test]
    fn empty_side_yields_nothing() {
        let catalog: Catalog = [("A".to_string(), listing("A"))].into_iter().collect();
        assert!(join(&catalog, &History::new()).is_empty());
        assert!(join(&Catalog::new(), &History::new()).is_empty());
    }

    #[test]
    fn join_is_deterministic() {
        let catalog: Catalog = ["Z", "M", "A"]
            .into_iter()
            .map(|n| (n.to_string(), listing(n)))
            .collect();
        let history: History = ["A", "M", "Z"]
            .into_iter()
            .map(|n| (n.to_string(), sales(n, 1.0)))
            .collect();
        assert_eq!(join(&catalog, &history), join(&catalog, &history));
    }
}
