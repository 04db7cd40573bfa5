use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Master file row (mirrors the columns written by skin-momentum)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MasterRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Skinport_URL")]
    pub skinport_url: String,
    #[serde(rename = "Steam_URL")]
    pub steam_url: String,
    #[serde(rename = "Price")]
    pub price: String,
    #[serde(rename = "Currency")]
    pub currency: String,
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
    pub last_updated: String,
}

/// Rows in file order; the writer already stores them ranked.
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<MasterRow>, csv::Error> {
    csv::Reader::from_reader(reader).deserialize().collect()
}

/// Same default location the scanner writes to.
pub fn default_master_path(env: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(p) = env("MASTER_PATH").filter(|p| !p.is_empty()) {
        return PathBuf::from(p);
    }
    let data_dir = env("DATA_DIR")
        .filter(|d| !d.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            env("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".skin_momentum")
        });
    let game = env("GAME").map_or_else(|| "cs2".to_string(), |g| canonical_game(&g));
    let currency = env("CURRENCY")
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "usd".to_string());
    data_dir.join(format!("master_{game}_{currency}.csv"))
}

/// Folds the `GAME` aliases the scanner accepts onto its file-name form.
fn canonical_game(raw: &str) -> String {
    match raw.trim().to_lowercase().as_str() {
        "" | "cs2" | "csgo" | "cs" => "cs2".to_string(),
        "dota2" | "dota" => "dota2".to_string(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    Loaded,
    Missing,
    Error(String),
}

#[derive(Debug)]
pub struct AppState {
    pub path: PathBuf,
    pub status: FileStatus,
    pub rows: Vec<MasterRow>,
    pub modified: Option<SystemTime>,
}

impl AppState {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            status: FileStatus::Missing,
            rows: Vec::new(),
            modified: None,
        }
    }

    /// Re-reads the file. A failed read keeps the previous rows on screen.
    pub fn reload(&mut self) {
        self.modified = modified_at(&self.path);
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.status = FileStatus::Missing;
                self.rows.clear();
                return;
            }
            Err(e) => {
                self.status = FileStatus::Error(e.to_string());
                return;
            }
        };
        match parse_rows(file) {
            Ok(rows) => {
                self.rows = rows;
                self.status = FileStatus::Loaded;
            }
            Err(e) => self.status = FileStatus::Error(format!("parse error: {e}")),
        }
    }

    /// Reloads only when the file's mtime moved. Returns whether it did.
    pub fn reload_if_changed(&mut self) -> bool {
        if modified_at(&self.path) == self.modified {
            return false;
        }
        self.reload();
        true
    }

    /// Most recent `LastUpdated` in the file. RFC 3339 UTC stamps sort as text.
    pub fn newest_update(&self) -> Option<&str> {
        self.rows.iter().map(|r| r.last_updated.as_str()).max()
    }

    pub fn selected_row(&self, index: Option<usize>) -> Option<&MasterRow> {
        index.and_then(|i| self.rows.get(i))
    }
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

pub fn format_opt(v: Option<f64>, decimals: usize) -> String {
    v.map_or("—".to_string(), |v| format!("{v:.decimals$}"))
}

pub fn format_sales(v: Option<i64>) -> String {
    v.map_or("—".to_string(), |v| v.to_string())
}

/// `2026-10-19T08:30:15Z` → `10-19 08:30`. Unparseable input is shown as-is.
pub fn format_stamp(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|t| t.format("%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Character-aware, so names with ★ or ™ never split mid-codepoint.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}
