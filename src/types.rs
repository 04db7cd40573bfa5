use std::str::FromStr;

use chrono::{DateTime, Utc};
use reqwest::Url;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{SKINPORT_MARKET_URL, STEAM_LISTINGS_URL};
use crate::error::{AppError, Result};

// ---------------------------------------------------------------------------
// Currency / game / mode enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Pln,
    Gbp,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Pln => "PLN",
            Currency::Gbp => "GBP",
        }
    }
}

impl FromStr for Currency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "PLN" => Ok(Currency::Pln),
            "GBP" => Ok(Currency::Gbp),
            other => Err(AppError::Validation(format!(
                "unsupported currency '{other}' (expected USD, EUR, PLN or GBP)"
            ))),
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Game {
    Cs2,
    Dota2,
    Tf2,
    Rust,
}

impl Game {
    /// Steam application id, also used as Skinport's `app_id` parameter.
    pub fn app_id(self) -> u32 {
        match self {
            Game::Cs2 => 730,
            Game::Dota2 => 570,
            Game::Tf2 => 440,
            Game::Rust => 252490,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Game::Cs2 => "Counter-Strike 2",
            Game::Dota2 => "Dota 2",
            Game::Tf2 => "Team Fortress 2",
            Game::Rust => "Rust",
        }
    }

    /// Skinport search page for an item. CS2 lives at the market root.
    pub fn market_url(self, name: &str) -> String {
        let base = match self {
            Game::Cs2 => SKINPORT_MARKET_URL.to_string(),
            other => format!("{SKINPORT_MARKET_URL}/{other}"),
        };
        match Url::parse_with_params(&base, &[("search", name)]) {
            Ok(url) => url.to_string(),
            Err(_) => base,
        }
    }

    /// Steam Community Market listing page for an item.
    pub fn steam_url(self, name: &str) -> String {
        let Ok(mut url) = Url::parse(STEAM_LISTINGS_URL) else {
            return STEAM_LISTINGS_URL.to_string();
        };
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(&self.app_id().to_string()).push(name);
        }
        url.to_string()
    }
}

impl FromStr for Game {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cs2" | "csgo" | "cs" => Ok(Game::Cs2),
            "dota2" | "dota" => Ok(Game::Dota2),
            "tf2" => Ok(Game::Tf2),
            "rust" => Ok(Game::Rust),
            other => Err(AppError::Validation(format!(
                "unsupported game '{other}' (expected cs2, dota2, tf2 or rust)"
            ))),
        }
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Game::Cs2 => "cs2",
            Game::Dota2 => "dota2",
            Game::Tf2 => "tf2",
            Game::Rust => "rust",
        };
        write!(f, "{s}")
    }
}

/// How a new ranked batch is reconciled with the persisted master record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistMode {
    /// Persisted set is replaced by the new batch.
    Overwrite,
    /// Last-write-wins per identity; identities only in the persisted set are kept.
    Merge,
}

impl FromStr for PersistMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "overwrite" => Ok(PersistMode::Overwrite),
            "merge" => Ok(PersistMode::Merge),
            other => Err(AppError::Validation(format!(
                "unknown mode '{other}' (expected merge or overwrite)"
            ))),
        }
    }
}

impl std::fmt::Display for PersistMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistMode::Overwrite => write!(f, "overwrite"),
            PersistMode::Merge => write!(f, "merge"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Csv,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Csv => "csv",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "html" => Ok(ReportFormat::Html),
            "csv" => Ok(ReportFormat::Csv),
            other => Err(AppError::Validation(format!(
                "unknown format '{other}' (expected html or csv)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Normalized records
// ---------------------------------------------------------------------------

/// One catalog entry: the cheapest current listing of an item.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRecord {
    pub name: String,
    pub price: Decimal,
    pub currency: Currency,
    pub market_url: String,
    pub steam_url: String,
}

/// Sales-history aggregates. Every field is independently optional: upstream
/// omits windows with no sales, and "missing" must never read as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesAggregate {
    pub name: String,
    pub avg_24h: Option<f64>,
    pub volume_24h: Option<i64>,
    pub avg_7d: Option<f64>,
    pub volume_7d: Option<i64>,
    pub avg_30d: Option<f64>,
}

/// Inner-join product of a listing and its sales history, not yet scored.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    pub listing: ListingRecord,
    pub sales: SalesAggregate,
}

impl JoinedRecord {
    pub fn name(&self) -> &str {
        &self.listing.name
    }
}

/// A scored item. Built once per run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedItem {
    pub listing: ListingRecord,
    pub sales: SalesAggregate,
    /// 24h avg / 7d avg; `None` when the ratio was not computable.
    pub growth_short: Option<f64>,
    /// 7d avg / 30d avg; `None` when the ratio was not computable.
    pub growth_medium: Option<f64>,
    pub bullish_score: f64,
    pub last_updated: DateTime<Utc>,
}

impl JoinedItem {
    pub fn name(&self) -> &str {
        &self.listing.name
    }
}

// ---------------------------------------------------------------------------
// Filter parameters
// ---------------------------------------------------------------------------

/// Validated predicate parameters for the filter & rank stage.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    pub currency: Currency,
    /// Inclusive; `None` means 0.
    pub min_price: Option<Decimal>,
    /// Inclusive; `None` means unbounded.
    pub max_price: Option<Decimal>,
    pub min_sales_week: u64,
    /// Lower-cased, trimmed, de-duplicated filter tokens.
    pub tokens: Vec<String>,
    pub max_results: Option<usize>,
}

impl FilterParams {
    pub fn new<I, S>(
        currency: Currency,
        min_price: Option<Decimal>,
        max_price: Option<Decimal>,
        min_sales_week: u64,
        tokens: I,
        max_results: Option<usize>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(min) = min_price {
            if min.is_sign_negative() && !min.is_zero() {
                return Err(AppError::Validation(format!("min price {min} is negative")));
            }
        }
        if let Some(max) = max_price {
            if max.is_sign_negative() && !max.is_zero() {
                return Err(AppError::Validation(format!("max price {max} is negative")));
            }
        }
        if let (Some(min), Some(max)) = (min_price, max_price) {
            if max < min {
                return Err(AppError::Validation(format!(
                    "max price {max} is below min price {min}"
                )));
            }
        }
        if max_results == Some(0) {
            return Err(AppError::Validation("max results must be at least 1".to_string()));
        }

        let mut normalized: Vec<String> = Vec::new();
        for token in tokens {
            let t = token.as_ref().trim().to_lowercase();
            if !t.is_empty() && !normalized.contains(&t) {
                normalized.push(t);
            }
        }

        Ok(Self {
            currency,
            min_price,
            max_price,
            min_sales_week,
            tokens: normalized,
            max_results,
        })
    }

    pub fn price_in_range(&self, price: Decimal) -> bool {
        let min = self.min_price.unwrap_or(Decimal::ZERO);
        price >= min && self.max_price.map_or(true, |max| price <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn currency_parses_case_insensitively() {
        assert_eq!("pln".parse::<Currency>().unwrap(), Currency::Pln);
        assert_eq!(" Gbp ".parse::<Currency>().unwrap(), Currency::Gbp);
        assert!(matches!("JPY".parse::<Currency>(), Err(AppError::Validation(_))));
    }

    #[test]
    fn max_below_min_is_rejected() {
        let err = FilterParams::new(
            Currency::Usd,
            Some(dec("10")),
            Some(dec("5")),
            0,
            Vec::<String>::new(),
            None,
        );
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn equal_bounds_are_allowed_and_inclusive() {
        let p = FilterParams::new(
            Currency::Usd,
            Some(dec("5")),
            Some(dec("5")),
            0,
            Vec::<String>::new(),
            None,
        )
        .unwrap();
        assert!(p.price_in_range(dec("5")));
        assert!(!p.price_in_range(dec("5.01")));
    }

    #[test]
    fn missing_bounds_mean_zero_and_unbounded() {
        let p = FilterParams::new(Currency::Usd, None, None, 0, Vec::<String>::new(), None).unwrap();
        assert!(p.price_in_range(Decimal::ZERO));
        assert!(p.price_in_range(dec("99999.99")));
        assert!(!p.price_in_range(dec("-0.01")));
    }

    #[test]
    fn tokens_are_normalized() {
        let p = FilterParams::new(
            Currency::Eur,
            None,
            None,
            0,
            [" Knife", "AK-47", "knife", ""],
            None,
        )
        .unwrap();
        assert_eq!(p.tokens, vec!["knife".to_string(), "ak-47".to_string()]);
    }

    #[test]
    fn steam_url_encodes_name() {
        let url = Game::Cs2.steam_url("★ Karambit | Fade (Factory New)");
        assert!(url.starts_with("https://steamcommunity.com/market/listings/730/"));
        assert!(!url.contains(' '));
    }

    #[test]
    fn market_url_uses_game_path() {
        assert!(Game::Cs2.market_url("AK-47 | Redline").starts_with("https://skinport.com/market?search="));
        assert!(Game::Dota2.market_url("Arcana").starts_with("https://skinport.com/market/dota2?search="));
    }
}
