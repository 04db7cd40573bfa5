use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pipeline::Ranked;
use crate::types::{Currency, JoinedItem};

/// One row of the master record set, in column order.
pub const COLUMNS: [&str; 13] = [
    "Name",
    "Skinport_URL",
    "Steam_URL",
    "Price",
    "Currency",
    "SalesThisWeek",
    "7d_avg",
    "24h_avg",
    "30d_avg",
    "7d_vs_30d",
    "GrowthRatio",
    "BullishScore",
    "LastUpdated",
];

/// Persisted form of a scored item. Empty cells are missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Skinport_URL")]
    pub skinport_url: String,
    #[serde(rename = "Steam_URL")]
    pub steam_url: String,
    #[serde(rename = "Price", with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(rename = "Currency")]
    pub currency: Currency,
    #[serde(rename = "SalesThisWeek")]
    pub sales_this_week: Option<i64>,
    #[serde(rename = "7d_avg")]
    pub avg_7d: Option<f64>,
    #[serde(rename = "24h_avg")]
    pub avg_24h: Option<f64>,
    #[serde(rename = "30d_avg")]
    pub avg_30d: Option<f64>,
    #[serde(rename = "7d_vs_30d")]
    pub growth_medium: Option<f64>,
    #[serde(rename = "GrowthRatio")]
    pub growth_short: Option<f64>,
    #[serde(rename = "BullishScore")]
    pub bullish_score: f64,
    #[serde(rename = "LastUpdated")]
    pub last_updated: DateTime<Utc>,
}

impl From<&JoinedItem> for MasterRecord {
    fn from(item: &JoinedItem) -> Self {
        Self {
            name: item.listing.name.clone(),
            skinport_url: item.listing.market_url.clone(),
            steam_url: item.listing.steam_url.clone(),
            price: item.listing.price,
            currency: item.listing.currency,
            sales_this_week: item.sales.volume_7d,
            avg_7d: item.sales.avg_7d,
            avg_24h: item.sales.avg_24h,
            avg_30d: item.sales.avg_30d,
            growth_medium: item.growth_medium,
            growth_short: item.growth_short,
            bullish_score: item.bullish_score,
            last_updated: item.last_updated.trunc_subsecs(0),
        }
    }
}

impl Ranked for MasterRecord {
    fn identity(&self) -> &str {
        &self.name
    }

    fn rank_score(&self) -> f64 {
        self.bullish_score
    }

    fn rank_volume(&self) -> i64 {
        self.sales_this_week.unwrap_or(0)
    }
}
