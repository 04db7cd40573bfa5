use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{AppError, Result};
use crate::types::{Currency, FilterParams, Game, PersistMode, ReportFormat};

pub const SKINPORT_API_URL: &str = "https://api.skinport.com/v1";
pub const SKINPORT_MARKET_URL: &str = "https://skinport.com/market";
pub const STEAM_LISTINGS_URL: &str = "https://steamcommunity.com/market/listings";

pub const USER_AGENT: &str = "skin-momentum/0.1";

/// HTTP timeout for a single Skinport request (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Delay before each retry of a failed GET, in milliseconds. Length = retry count.
pub const RETRY_BACKOFF_MS: &[u64] = &[500, 1000, 2000];

/// Payload cache TTL (seconds). Skinport refreshes these endpoints a few times a day.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 43_200;

/// Quality marker carried by knives and gloves in CS2 market names.
pub const RARITY_GLYPH: char = '★';

/// Momentum score weights. Fixed at compile time.
pub mod score_weights {
    pub const GROWTH_SHORT: f64 = 0.6;
    pub const GROWTH_MEDIUM: f64 = 0.4;
    /// Ratio used when a growth ratio cannot be computed: no signal either way.
    pub const NEUTRAL_GROWTH: f64 = 1.0;
}

/// What the orchestrator does when merge mode finds an unreadable master file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptMasterPolicy {
    Abort,
    Overwrite,
}

impl FromStr for CorruptMasterPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(CorruptMasterPolicy::Abort),
            "overwrite" => Ok(CorruptMasterPolicy::Overwrite),
            other => Err(AppError::Config(format!(
                "ON_CORRUPT_MASTER must be abort or overwrite, got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub log_level: String,
    pub game: Game,
    pub filter: FilterParams,
    pub mode: PersistMode,
    pub format: ReportFormat,
    pub output_path: PathBuf,
    pub data_dir: PathBuf,
    pub master_path: PathBuf,
    /// `None` disables the payload cache (CACHE_TTL_SECS=0).
    pub cache_ttl_secs: Option<u64>,
    pub category_table_path: Option<PathBuf>,
    pub on_corrupt_master: CorruptMasterPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let game: Game = var("GAME").as_deref().unwrap_or("cs2").parse()?;
        let currency: Currency = var("CURRENCY").as_deref().unwrap_or("USD").parse()?;

        let min_price = var("MIN_PRICE").map(|v| parse_price("MIN_PRICE", &v)).transpose()?;
        let max_price = var("MAX_PRICE").map(|v| parse_price("MAX_PRICE", &v)).transpose()?;
        let min_sales_week = match var("MIN_SALES_WEEK") {
            Some(v) => v.trim().parse::<u64>().map_err(|_| {
                AppError::Validation(format!(
                    "MIN_SALES_WEEK must be a non-negative integer, got '{v}'"
                ))
            })?,
            None => 0,
        };
        let max_results = match var("MAX_RESULTS") {
            Some(v) => Some(v.trim().parse::<usize>().map_err(|_| {
                AppError::Validation(format!("MAX_RESULTS must be a positive integer, got '{v}'"))
            })?),
            None => None,
        };
        let tokens: Vec<String> = var("FILTERS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let filter = FilterParams::new(
            currency,
            min_price,
            max_price,
            min_sales_week,
            tokens,
            max_results,
        )?;

        let mode: PersistMode = var("MODE").as_deref().unwrap_or("merge").parse()?;
        let format: ReportFormat = var("FORMAT").as_deref().unwrap_or("html").parse()?;

        let data_dir = var("DATA_DIR").map(PathBuf::from).unwrap_or_else(|| {
            var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".skin_momentum")
        });
        let master_path = var("MASTER_PATH").map(PathBuf::from).unwrap_or_else(|| {
            data_dir.join(format!("master_{}_{}.csv", game, currency.code().to_lowercase()))
        });
        let output_path = var("OUTPUT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("skin_momentum.{}", format.extension())));

        let cache_ttl_secs = match var("CACHE_TTL_SECS") {
            Some(v) => v.trim().parse::<u64>().map_err(|_| {
                AppError::Config(format!("CACHE_TTL_SECS must be a number of seconds, got '{v}'"))
            })?,
            None => DEFAULT_CACHE_TTL_SECS,
        };

        Ok(Self {
            api_url: var("SKINPORT_API_URL").unwrap_or_else(|| SKINPORT_API_URL.to_string()),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            game,
            filter,
            mode,
            format,
            output_path,
            master_path,
            cache_ttl_secs: (cache_ttl_secs > 0).then_some(cache_ttl_secs),
            category_table_path: var("CATEGORY_TABLE_PATH").map(PathBuf::from),
            on_corrupt_master: var("ON_CORRUPT_MASTER")
                .as_deref()
                .unwrap_or("abort")
                .parse()?,
            data_dir,
        })
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("cache")
    }
}

fn parse_price(key: &str, raw: &str) -> Result<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|_| AppError::Validation(format!("{key} must be a decimal number, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = config_from(&[("HOME", "/home/tester")]).unwrap();
        assert_eq!(cfg.game, Game::Cs2);
        assert_eq!(cfg.filter.currency, Currency::Usd);
        assert_eq!(cfg.mode, PersistMode::Merge);
        assert_eq!(cfg.format, ReportFormat::Html);
        assert_eq!(cfg.cache_ttl_secs, Some(DEFAULT_CACHE_TTL_SECS));
        assert_eq!(cfg.on_corrupt_master, CorruptMasterPolicy::Abort);
        assert_eq!(
            cfg.master_path,
            PathBuf::from("/home/tester/.skin_momentum/master_cs2_usd.csv")
        );
        assert_eq!(cfg.output_path, PathBuf::from("skin_momentum.html"));
        assert!(cfg.filter.tokens.is_empty());
    }

    #[test]
    fn filter_values_are_read() {
        let cfg = config_from(&[
            ("CURRENCY", "eur"),
            ("MIN_PRICE", "1.5"),
            ("MAX_PRICE", "250"),
            ("MIN_SALES_WEEK", "12"),
            ("FILTERS", "knife, ak-47 ,,gloves"),
            ("MODE", "overwrite"),
            ("FORMAT", "csv"),
            ("CACHE_TTL_SECS", "0"),
        ])
        .unwrap();
        assert_eq!(cfg.filter.currency, Currency::Eur);
        assert_eq!(cfg.filter.min_price, Some("1.5".parse().unwrap()));
        assert_eq!(cfg.filter.max_price, Some("250".parse().unwrap()));
        assert_eq!(cfg.filter.min_sales_week, 12);
        assert_eq!(cfg.filter.tokens, vec!["knife", "ak-47", "gloves"]);
        assert_eq!(cfg.mode, PersistMode::Overwrite);
        assert_eq!(cfg.output_path, PathBuf::from("skin_momentum.csv"));
        assert_eq!(cfg.cache_ttl_secs, None);
    }

    #[test]
    fn inverted_price_window_is_a_validation_error() {
        let err = config_from(&[("MIN_PRICE", "20"), ("MAX_PRICE", "10")]).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "got {err}");
    }

    #[test]
    fn negative_min_sales_is_rejected() {
        let err = config_from(&[("MIN_SALES_WEEK", "-3")]).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "got {err}");
    }

    #[test]
    fn bad_ttl_is_a_config_error() {
        let err = config_from(&[("CACHE_TTL_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)), "got {err}");
    }
}
