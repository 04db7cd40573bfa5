use std::collections::BTreeMap;

use serde_json::Value;
use tracing::warn;

use super::value_as_decimal;
use crate::types::{Currency, Game, ListingRecord};

/// identity → listing
pub type Catalog = BTreeMap<String, ListingRecord>;

#[derive(Debug, Default)]
pub struct CatalogStats {
    pub raw_total: usize,
    pub rejected_no_name: usize,
    /// No active listing, so no representative price.
    pub rejected_no_price: usize,
    pub rejected_currency: usize,
    pub duplicates: usize,
}

/// Normalizes the `/items` payload. `requested` is used when an entry omits
/// its currency; entries quoting an unsupported currency are dropped.
pub fn load_catalog(raw: &[Value], game: Game, requested: Currency) -> (Catalog, CatalogStats) {
    let mut catalog = Catalog::new();
    let mut stats = CatalogStats {
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

        let Some(price) = entry.get("min_price").and_then(value_as_decimal) else {
            stats.rejected_no_price += 1;
            continue;
        };

        let currency = match entry.get("currency").and_then(|c| c.as_str()) {
            None => requested,
            Some(code) => match code.parse::<Currency>() {
                Ok(c) => c,
                Err(_) => {
                    stats.rejected_currency += 1;
                    continue;
                }
            },
        };

        let record = ListingRecord {
            name: name.to_string(),
            price,
            currency,
            market_url: game.market_url(name),
            steam_url: game.steam_url(name),
        };
        if catalog.insert(record.name.clone(), record).is_some() {
            stats.duplicates += 1;
        }
    }

    if stats.duplicates > 0 {
        warn!("Catalog payload repeated {} item names; last entry kept", stats.duplicates);
    }
    (catalog, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_listing_fields() {
        let raw = vec![json!({
            "market_hash_name": "AK-47 | Redline (Field-Tested)",
            "currency": "EUR",
            "min_price": 12.34,
            "max_price": 20.0,
            "quantity": 40
        })];
        let (catalog, stats) = load_catalog(&raw, Game::Cs2, Currency::Usd);

        assert_eq!(stats.raw_total, 1);
        let rec = &catalog["AK-47 | Redline (Field-Tested)"];
        assert_eq!(rec.price, "12.34".parse().unwrap());
        assert_eq!(rec.currency, Currency::Eur);
        assert!(rec.market_url.contains("search="));
        assert!(rec.steam_url.contains("/730/"));
    }

    #[test]
    fn entries_without_name_or_price_are_dropped() {
        let raw = vec![
            json!({"min_price": 1.0}),
            json!({"market_hash_name": "", "min_price": 1.0}),
            json!({"market_hash_name": "Glock-18 | Fade", "min_price": null}),
            json!({"market_hash_name": "P250 | Sand Dune"}),
        ];
        let (catalog, stats) = load_catalog(&raw, Game::Cs2, Currency::Usd);

        assert!(catalog.is_empty());
        assert_eq!(stats.rejected_no_name, 2);
        assert_eq!(stats.rejected_no_price, 2);
    }

    #[test]
    fn missing_currency_defaults_to_requested_and_unknown_is_dropped() {
        let raw = vec![
            json!({"market_hash_name": "A", "min_price": 1}),
            json!({"market_hash_name": "B", "min_price": 1, "currency": "JPY"}),
        ];
        let (catalog, stats) = load_catalog(&raw, Game::Cs2, Currency::Pln);

        assert_eq!(catalog["A"].currency, Currency::Pln);
        assert!(!catalog.contains_key("B"));
        assert_eq!(stats.rejected_currency, 1);
    }

    #[test]
    fn duplicate_names_keep_last_entry() {
        let raw = vec![
            json!({"market_hash_name": "A", "min_price": 1}),
            json!({"market_hash_name": "A", "min_price": 2}),
        ];
        let (catalog, stats) = load_catalog(&raw, Game::Cs2, Currency::Usd);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog["A"].price, rust_decimal::Decimal::from(2));
        assert_eq!(stats.duplicates, 1);
    }
}
