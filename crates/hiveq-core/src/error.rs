//! Error types for the query pipeline.
//!
//! [`QueryError`] is what the run boundary sees; [`QueryError::severity`]
//! maps every failure onto the three outcomes the binary reports.

use std::path::PathBuf;

use crate::criteria::DateParseError;

/// Failures raised by a [`HiveStore`](crate::store::HiveStore) implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid search pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Every way a single run can end early.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("hive file not found: {}", .0.display())]
    HiveNotFound(PathBuf),

    #[error("invalid {bound} date {input:?}: {reason}")]
    InvalidDate {
        bound: &'static str,
        input: String,
        reason: String,
    },

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("value {value:?} not found in key {key}")]
    ValueNotFound { key: String, value: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),

    #[error("failed to export value to {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// How a [`QueryError`] is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Bad user input: missing hive, unparseable date.
    FatalInput,
    /// The requested key or value does not exist.
    NotFound,
    /// Anything raised while querying, rendering or exporting.
    Unexpected,
}

impl QueryError {
    pub fn invalid_date(bound: &'static str, err: DateParseError) -> Self {
        QueryError::InvalidDate {
            bound,
            input: err.input,
            reason: err.reason,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            QueryError::HiveNotFound(_) | QueryError::InvalidDate { .. } => Severity::FatalInput,
            QueryError::KeyNotFound(_) | QueryError::ValueNotFound { .. } => Severity::NotFound,
            QueryError::Store(_)
            | QueryError::Output(_)
            | QueryError::Export { .. }
            | QueryError::Other(_) => Severity::Unexpected,
        }
    }
}
