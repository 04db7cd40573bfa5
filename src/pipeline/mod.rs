//! Join → score → filter & rank over one run's loaded data.

pub mod joiner;
pub mod ranker;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::classifier::Classifier;
use crate::loader::{Catalog, History};
use crate::scorer::score_item;
use crate::types::{FilterParams, JoinedItem};

pub use joiner::join;
pub use ranker::{filter_and_rank, sort_ranked, Ranked};

/// Per-run counters, logged once as the run summary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PipelineStats {
    pub catalog: usize,
    pub history: usize,
    pub joined: usize,
    pub invalid: usize,
    pub rejected_currency: usize,
    pub rejected_price: usize,
    pub rejected_sales: usize,
    pub rejected_category: usize,
    pub kept: usize,
    pub truncated: usize,
}

impl PipelineStats {
    pub fn rejected(&self) -> usize {
        self.rejected_currency + self.rejected_price + self.rejected_sales + self.rejected_category
    }
}

#[derive(Debug)]
pub struct PipelineOutput {
    /// Ranked, filtered and truncated.
    pub items: Vec<JoinedItem>,
    pub stats: PipelineStats,
}

/// Runs one batch. Invalid records are logged and skipped, never fatal.
pub fn run(
    catalog: &Catalog,
    history: &History,
    params: &FilterParams,
    classifier: &Classifier,
    now: DateTime<Utc>,
) -> PipelineOutput {
    let mut stats = PipelineStats {
        catalog: catalog.len(),
        history: history.len(),
        ..Default::default()
    };

    let joined = join(catalog, history);
    stats.joined = joined.len();

    let mut scored = Vec::with_capacity(joined.len());
    for record in joined {
        match score_item(record, now) {
            Ok(item) => scored.push(item),
            Err(e) => {
                warn!(error = %e, "skipping invalid record");
                stats.invalid += 1;
            }
        }
    }

    let items = filter_and_rank(scored, params, classifier, &mut stats);
    PipelineOutput { items, stats }
}
