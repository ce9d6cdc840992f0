//! Error types for loading and querying trade data.

use thiserror::Error;

/// Errors raised while loading or querying a trade dataset.
#[derive(Error, Debug)]
pub enum TradeError {
    /// The CSV header lacks one or more required columns.
    #[error("CSV file is missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    /// The requested reporter has no rows in the dataset.
    #[error("Unknown reporter: {0}")]
    UnknownReporter(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TradeError>;
