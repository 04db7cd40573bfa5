//! Ranked report output: CSV or a self-contained HTML page.

pub mod csv_report;
pub mod html;

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::Result;
use crate::persist::store::write_atomic;
use crate::persist::MasterRecord;
use crate::types::{Currency, Game, PersistMode, ReportFormat};

/// Run context shown in the report header.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub game: Game,
    pub currency: Currency,
    pub mode: PersistMode,
    pub filters: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Renders `rows` in their given order and writes them atomically to `path`.
pub fn write_report(
    format: ReportFormat,
    path: &Path,
    rows: &[MasterRecord],
    meta: &ReportMeta,
) -> Result<()> {
    let bytes = match format {
        ReportFormat::Csv => csv_report::render(rows)?,
        ReportFormat::Html => html::render(rows, meta).into_bytes(),
    };
    write_atomic(path, &bytes)?;
    info!(path = %path.display(), rows = rows.len(), "Report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> ReportMeta {
        ReportMeta {
            game: Game::Dota2,
            currency: Currency::Gbp,
            mode: PersistMode::Overwrite,
            filters: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn writes_both_formats() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("report.csv");
        write_report(ReportFormat::Csv, &csv_path, &[], &meta()).unwrap();
        assert!(std::fs::read_to_string(&csv_path).unwrap().starts_with("Name,"));

        let html_path = dir.path().join("out/report.html");
        write_report(ReportFormat::Html, &html_path, &[], &meta()).unwrap();
        let html = std::fs::read_to_string(&html_path).unwrap();
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("Filters: none"));
    }
}
