use std::cmp::Ordering;

use crate::classifier::Classifier;
use crate::pipeline::PipelineStats;
use crate::types::{FilterParams, JoinedItem};

/// Anything that can be put in report order.
pub trait Ranked {
    fn identity(&self) -> &str;
    fn rank_score(&self) -> f64;
    /// 7-day sales, 0 when unknown.
    fn rank_volume(&self) -> i64;
}

impl Ranked for JoinedItem {
    fn identity(&self) -> &str {
        self.name()
    }

    fn rank_score(&self) -> f64 {
        self.bullish_score
    }

    fn rank_volume(&self) -> i64 {
        self.sales.volume_7d.unwrap_or(0)
    }
}

/// Score descending, then 7-day volume descending, then name ascending.
pub fn rank_order<T: Ranked>(a: &T, b: &T) -> Ordering {
    b.rank_score()
        .total_cmp(&a.rank_score())
        .then_with(|| b.rank_volume().cmp(&a.rank_volume()))
        .then_with(|| a.identity().cmp(b.identity()))
}

pub fn sort_ranked<T: Ranked>(items: &mut [T]) {
    items.sort_by(rank_order);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Currency,
    Price,
    Sales,
    Category,
}

/// All predicates AND together; the first failing one is reported.
pub fn check(
    item: &JoinedItem,
    params: &FilterParams,
    classifier: &Classifier,
) -> Result<(), Rejection> {
    if item.listing.currency != params.currency {
        return Err(Rejection::Currency);
    }
    if !params.price_in_range(item.listing.price) {
        return Err(Rejection::Price);
    }
    let sales = u64::try_from(item.sales.volume_7d.unwrap_or(0)).unwrap_or(0);
    if sales < params.min_sales_week {
        return Err(Rejection::Sales);
    }
    if !classifier.matches_any(item.name(), &params.tokens) {
        return Err(Rejection::Category);
    }
    Ok(())
}

/// Filters, sorts into report order and truncates to `params.max_results`.
pub fn filter_and_rank(
    items: Vec<JoinedItem>,
    params: &FilterParams,
    classifier: &Classifier,
    stats: &mut PipelineStats,
) -> Vec<JoinedItem> {
    let mut kept: Vec<JoinedItem> = Vec::with_capacity(items.len());
    for item in items {
        match check(&item, params, classifier) {
            Ok(()) => kept.push(item),
            Err(Rejection::Currency) => stats.rejected_currency += 1,
            Err(Rejection::Price) => stats.rejected_price += 1,
            Err(Rejection::Sales) => stats.rejected_sales += 1,
            Err(Rejection::Category) => stats.rejected_category += 1,
        }
    }

    sort_ranked(&mut kept);

    if let Some(limit) = params.max_results {
        if kept.len() > limit {
            stats.truncated = kept.len() - limit;
            kept.truncate(limit);
        }
    }
    stats.kept = kept.len();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::CategoryTable;
    use crate::types::{Currency, Game, ListingRecord, SalesAggregate};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn item(name: &str, price: &str, score: f64, volume_7d: Option<i64>) -> JoinedItem {
        JoinedItem {
            listing: ListingRecord {
                name: name.to_string(),
                price: price.parse().unwrap(),
                currency: Currency::Usd,
                market_url: String::new(),
                steam_url: String::new(),
            },
            sales: SalesAggregate {
                name: name.to_string(),
                volume_7d,
                ..Default::default()
            },
            growth_short: None,
            growth_medium: None,
            bullish_score: score,
            last_updated: Utc::now(),
        }
    }

    fn params(min: Option<&str>, max: Option<&str>, min_sales: u64, tokens: &[&str]) -> FilterParams {
        FilterParams::new(
            Currency::Usd,
            min.map(|m| m.parse().unwrap()),
            max.map(|m| m.parse().unwrap()),
            min_sales,
            tokens.iter().copied(),
            None,
        )
        .unwrap()
    }

    fn classifier() -> Classifier {
        Classifier::new(&CategoryTable::builtin(Game::Cs2))
    }

    fn names(items: &[JoinedItem]) -> Vec<&str> {
        items.iter().map(|i| i.name()).collect()
    }

    #[test]
    fn price_window_drops_middle_item_and_keeps_order() {
        let items = vec![
            item("A", "10", 5.0, Some(10)),
            item("B", "50", 3.2, Some(10)),
            item("C", "12", 3.2, Some(10)),
        ];
        let mut stats = PipelineStats::default();
        let out = filter_and_rank(items, &params(None, Some("20"), 0, &[]), &classifier(), &mut stats);

        assert_eq!(names(&out), vec!["A", "C"]);
        assert!(out[0].bullish_score >= out[1].bullish_score);
        assert_eq!(stats.rejected_price, 1);
        assert_eq!(stats.kept, 2);
    }

    #[test]
    fn ties_break_by_volume_then_name() {
        let items = vec![
            item("Zeta", "1", 2.0, Some(5)),
            item("Alpha", "1", 2.0, Some(5)),
            item("Mid", "1", 2.0, Some(50)),
            item("Top", "1", 9.0, None),
        ];
        let mut stats = PipelineStats::default();
        let out = filter_and_rank(items, &params(None, None, 0, &[]), &classifier(), &mut stats);

        assert_eq!(names(&out), vec!["Top", "Mid", "Alpha", "Zeta"]);
    }

    #[test]
    fn min_sales_treats_missing_volume_as_zero() {
        let items = vec![item("A", "1", 1.0, None), item("B", "1", 1.0, Some(7))];
        let mut stats = PipelineStats::default();
        let out = filter_and_rank(items, &params(None, None, 7, &[]), &classifier(), &mut stats);

        assert_eq!(names(&out), vec!["B"]);
        assert_eq!(stats.rejected_sales, 1);
    }

    #[test]
    fn inclusive_bounds() {
        let p = params(Some("1.50"), Some("2.50"), 0, &[]);
        let c = classifier();
        assert!(check(&item("lo", "1.50", 1.0, None), &p, &c).is_ok());
        assert!(check(&item("hi", "2.50", 1.0, None), &p, &c).is_ok());
        assert_eq!(check(&item("x", "2.51", 1.0, None), &p, &c), Err(Rejection::Price));
    }

    #[test]
    fn currency_and_category_predicates() {
        let c = classifier();
        let p = params(None, None, 0, &["knife"]);

        let mut eur = item("★ Karambit | Fade", "100", 1.0, None);
        eur.listing.currency = Currency::Eur;
        assert_eq!(check(&eur, &p, &c), Err(Rejection::Currency));

        let gloves = item("★ Sport Gloves | Fade", "100", 1.0, None);
        assert_eq!(check(&gloves, &p, &c), Err(Rejection::Category));
        assert!(check(&item("★ Karambit | Fade", "100", 1.0, None), &p, &c).is_ok());
    }

    #[test]
    fn truncates_after_sorting() {
        let items = vec![
            item("A", "1", 1.0, None),
            item("B", "1", 3.0, None),
            item("C", "1", 2.0, None),
        ];
        let mut p = params(None, None, 0, &[]);
        p.max_results = Some(2);
        let mut stats = PipelineStats::default();
        let out = filter_and_rank(items, &p, &classifier(), &mut stats);

        assert_eq!(names(&out), vec!["B", "C"]);
        assert_eq!(stats.truncated, 1);
        assert_eq!(stats.kept, 2);
    }

    #[test]
    fn zero_price_item_passes_default_window() {
        let p = params(None, None, 0, &[]);
        assert!(check(&item("free", "0", 1.0, None), &p, &classifier()).is_ok());
        assert!(p.price_in_range(Decimal::ZERO));
    }
}
