//! Error types shared by the extractors, the record builder and the trial merger.

use std::path::PathBuf;

use thiserror::Error;

use crate::stats::StatsError;

/// Fatal conditions raised while collecting or combining benchmark results.
///
/// Recovered conditions (malformed lines, a missing one-time marker) never
/// surface here; extractors skip them silently.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// A required log, config or results file does not exist or cannot be opened.
    #[error("missing input {}: {source}", path.display())]
    MissingInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file was read but its contents are not what the analyzer expects.
    #[error("invalid input {}: {reason}", path.display())]
    InvalidInput { path: PathBuf, reason: String },

    /// An analysis configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A metric required by the cross-trial reduction is absent under every known name.
    #[error("metric '{metric}' unavailable: {reason}")]
    MissingMetric { metric: String, reason: String },

    /// No record of a batch matches a canonical shape or query.
    #[error("no record in batch {batch} matches {shape}; candidates:\n{}", candidates.join("\n"))]
    NoMatch {
        batch: usize,
        shape: String,
        candidates: Vec<String>,
    },

    /// Several records of one batch match a canonical shape or query.
    #[error("{} records in batch {batch} match {shape}:\n{}", matches.len(), matches.join("\n"))]
    AmbiguousMatch {
        batch: usize,
        shape: String,
        matches: Vec<String>,
    },

    #[error(transparent)]
    Statistics(#[from] StatsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalyzerError {
    pub(crate) fn missing_input(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalyzerError::MissingInput {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn missing_metric(metric: impl Into<String>, reason: impl Into<String>) -> Self {
        AnalyzerError::MissingMetric {
            metric: metric.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = AnalyzerError> = std::result::Result<T, E>;
