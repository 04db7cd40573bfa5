mod cache;
mod classifier;
mod config;
mod error;
mod fetcher;
mod loader;
mod persist;
mod pipeline;
mod report;
mod scorer;
mod types;

use chrono::Utc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::classifier::{CategoryTable, Classifier};
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::SkinportClient;
use crate::loader::{load_catalog, load_history};
use crate::persist::{MasterRecord, MasterStore};
use crate::pipeline::PipelineStats;
use crate::report::{write_report, ReportMeta};

/// How many of the top-ranked items are echoed to the log.
const TOP_LOGGED: usize = 10;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let started = Utc::now();
    info!(
        "Starting run: game={} currency={} mode={} format={}",
        cfg.game, cfg.filter.currency, cfg.mode, cfg.format.extension(),
    );

    // --- Category table ---
    let table = match &cfg.category_table_path {
        Some(path) => {
            let table = CategoryTable::from_json_file(path)?;
            info!("Loaded {} category rules from {}", table.rules.len(), path.display());
            table
        }
        None => CategoryTable::builtin(cfg.game),
    };
    let classifier = Classifier::new(&table);

    // --- Fetch both endpoints concurrently ---
    let client = SkinportClient::new(&cfg)?;
    let currency = cfg.filter.currency;
    let (raw_items, raw_history) = tokio::try_join!(
        client.fetch_items(cfg.game, currency),
        client.fetch_sales_history(cfg.game, currency),
    )?;

    // --- Normalize ---
    let (catalog, catalog_stats) = load_catalog(&raw_items, cfg.game, currency);
    let (history, history_stats) = load_history(&raw_history);
    info!(
        "[LOAD] catalog: {} of {} (no_name={} no_price={} currency={} dup={}) | history: {} of {} (no_name={} dup={})",
        catalog.len(),
        catalog_stats.raw_total,
        catalog_stats.rejected_no_name,
        catalog_stats.rejected_no_price,
        catalog_stats.rejected_currency,
        catalog_stats.duplicates,
        history.len(),
        history_stats.raw_total,
        history_stats.rejected_no_name,
        history_stats.duplicates,
    );

    // --- Join, score, filter & rank ---
    let output = pipeline::run(&catalog, &history, &cfg.filter, &classifier, started);
    log_summary(&cfg, &output.stats);

    let batch: Vec<MasterRecord> = output.items.iter().map(MasterRecord::from).collect();
    for (i, rec) in batch.iter().take(TOP_LOGGED).enumerate() {
        info!(
            "  #{:<2} {:>8.3}  {} {} sales7d={:<5} {}",
            i + 1,
            rec.bullish_score,
            rec.price,
            rec.currency,
            rec.sales_this_week.map_or_else(|| "-".to_string(), |v| v.to_string()),
            rec.name,
        );
    }

    // --- Persist ---
    let store = MasterStore::new(&cfg.master_path);
    let persisted = store.persist_with_policy(batch, cfg.mode, cfg.on_corrupt_master)?;

    // --- Report ---
    let meta = ReportMeta {
        game: cfg.game,
        currency,
        mode: cfg.mode,
        filters: cfg.filter.tokens.clone(),
        generated_at: started,
    };
    write_report(cfg.format, &cfg.output_path, &persisted, &meta)?;

    let elapsed_ms = (Utc::now() - started).num_milliseconds();
    info!(
        "Done in {elapsed_ms}ms: {} ranked this run, {} in master set {}, report at {}",
        output.items.len(),
        persisted.len(),
        store.path().display(),
        cfg.output_path.display(),
    );
    Ok(())
}

fn log_summary(cfg: &Config, stats: &PipelineStats) {
    info!(
        event = "RUN_SUMMARY",
        game = %cfg.game,
        currency = %cfg.filter.currency,
        joined = stats.joined,
        invalid = stats.invalid,
        rejected = stats.rejected(),
        kept = stats.kept,
        "RUN SUMMARY | catalog: {} | history: {} | joined: {} | invalid: {} | kept: {}",
        stats.catalog, stats.history, stats.joined, stats.invalid, stats.kept,
    );
    info!(
        "[FILTER] rejected: currency={} price={} sales={} category={} | truncated={} (min={} max={} min_sales={} tokens={:?} max_results={})",
        stats.rejected_currency,
        stats.rejected_price,
        stats.rejected_sales,
        stats.rejected_category,
        stats.truncated,
        cfg.filter.min_price.map_or_else(|| "0".to_string(), |p| p.to_string()),
        cfg.filter.max_price.map_or_else(|| "none".to_string(), |p| p.to_string()),
        cfg.filter.min_sales_week,
        cfg.filter.tokens,
        cfg.filter.max_results.map_or_else(|| "all".to_string(), |n| n.to_string()),
    );
    if stats.kept == 0 {
        warn!("No items passed the filters");
    }
}
