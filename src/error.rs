// ⚠️ Error taxonomy for loading, aggregating and selecting
// Load failures are fatal; validation failures leave state untouched.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// Out-of-domain user selection (dropdown or radio value).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{context}] {field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub context: String,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>, context: &str) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.into(),
            context: context.to_string(),
        }
    }
}

// ============================================================================
// DASHBOARD ERROR
// ============================================================================

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("data file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {} at line {line}: {source}", path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        #[source]
        source: csv::Error,
    },

    /// An expected bucket never occurs in the data. Only the equity
    /// aggregation raises this; every other absent bucket reads as zero.
    #[error("column '{field}' has no '{value}' rows")]
    MissingCategory { field: String, value: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, DashboardError>;
