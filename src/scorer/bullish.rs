use chrono::{DateTime, Utc};
use tracing::trace;

use crate::config::score_weights::{GROWTH_MEDIUM, GROWTH_SHORT, NEUTRAL_GROWTH};
use crate::error::RecordError;
use crate::types::{JoinedItem, JoinedRecord, SalesAggregate};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    /// avg_24h / avg_7d, when computable.
    pub growth_short: Option<f64>,
    /// avg_7d / avg_30d, when computable.
    pub growth_medium: Option<f64>,
    pub combined: f64,
    pub volume_factor: f64,
    pub bullish: f64,
}

/// Composite momentum score (higher = more bullish).
///
/// Short and medium growth ratios fall back to a neutral 1.0 when an average
/// is missing or the denominator is not positive. The blend is scaled by a
/// volume confidence factor `1 + log10(1 + vol_7d)`, with a missing 7d volume
/// counted as 0.
pub fn compute(record: &JoinedRecord) -> Result<Score, RecordError> {
    validate(record)?;
    let s = &record.sales;

    let growth_short = ratio(s.avg_24h, s.avg_7d);
    let growth_medium = ratio(s.avg_7d, s.avg_30d);

    let combined = GROWTH_SHORT * growth_short.unwrap_or(NEUTRAL_GROWTH)
        + GROWTH_MEDIUM * growth_medium.unwrap_or(NEUTRAL_GROWTH);
    let volume_factor = volume_factor(s.volume_7d);
    let bullish = combined * volume_factor;

    if !bullish.is_finite() {
        return Err(RecordError::NonFiniteScore {
            name: record.name().to_string(),
            score: bullish,
        });
    }

    Ok(Score {
        growth_short,
        growth_medium,
        combined,
        volume_factor,
        bullish,
    })
}

/// Scores a joined record into its final, immutable form.
pub fn score_item(record: JoinedRecord, now: DateTime<Utc>) -> Result<JoinedItem, RecordError> {
    let score = compute(&record)?;
    trace!(
        name = record.name(),
        combined = score.combined,
        volume_factor = score.volume_factor,
        bullish = score.bullish,
        "scored"
    );
    Ok(JoinedItem {
        listing: record.listing,
        sales: record.sales,
        growth_short: score.growth_short,
        growth_medium: score.growth_medium,
        bullish_score: score.bullish,
        last_updated: now,
    })
}

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d > 0.0 => Some(n / d),
        _ => None,
    }
}

fn volume_factor(volume_7d: Option<i64>) -> f64 {
    let vol = volume_7d.unwrap_or(0).max(0) as f64;
    1.0 + (1.0 + vol).log10()
}

fn validate(record: &JoinedRecord) -> Result<(), RecordError> {
    let name = record.name();
    if record.listing.price.is_sign_negative() && !record.listing.price.is_zero() {
        return Err(RecordError::NegativePrice {
            name: name.to_string(),
            price: record.listing.price.to_string(),
        });
    }

    let SalesAggregate {
        avg_24h,
        volume_24h,
        avg_7d,
        volume_7d,
        avg_30d,
        ..
    } = &record.sales;

    for (window, volume) in [("24h", volume_24h), ("7d", volume_7d)] {
        if let Some(v) = volume.filter(|v| *v < 0) {
            return Err(RecordError::NegativeVolume {
                name: name.to_string(),
                window,
                volume: v,
            });
        }
    }
    for (window, avg) in [("24h", avg_24h), ("7d", avg_7d), ("30d", avg_30d)] {
        if let Some(a) = avg.filter(|a| *a < 0.0 || !a.is_finite()) {
            return Err(RecordError::NegativeAverage {
                name: name.to_string(),
                window,
                avg: a,
            });
        }
    }
    Ok(())
}
