use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Filter parameters rejected before the pipeline runs.
    #[error("Invalid filter parameters: {0}")]
    Validation(String),

    /// Remote payload did not have the expected shape.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// The persisted master record set exists but cannot be read back.
    #[error("Master record set at {} is unreadable: {reason}", path.display())]
    PersistenceCorruption { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// A single item that cannot be scored. The pipeline logs and skips it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("{name}: negative price {price}")]
    NegativePrice { name: String, price: String },

    #[error("{name}: negative {window} volume {volume}")]
    NegativeVolume {
        name: String,
        window: &'static str,
        volume: i64,
    },

    #[error("{name}: negative {window} average {avg}")]
    NegativeAverage {
        name: String,
        window: &'static str,
        avg: f64,
    },

    #[error("{name}: score is not finite ({score})")]
    NonFiniteScore { name: String, score: f64 },
}
