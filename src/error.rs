use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinanceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not load {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    #[error("Missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    #[error("Category already exists: {0}")]
    DuplicateCategory(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Keyword cannot be empty")]
    EmptyKeyword,

    #[error("Keyword '{keyword}' already exists in {category}")]
    DuplicateKeyword { category: String, keyword: String },

    #[error("Keyword '{keyword}' not found in {category}")]
    UnknownKeyword { category: String, keyword: String },

    #[error("Column is not editable: {0}")]
    NotEditable(String),

    #[error("Row {row} out of range ({len} rows)")]
    RowOutOfRange { row: usize, len: usize },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

impl FinanceError {
    /// LoadErrors are reported and skipped; the pipeline keeps going.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Load { .. } | Self::Schema { .. })
    }
}

pub type Result<T> = std::result::Result<T, FinanceError>;
