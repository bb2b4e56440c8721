//! Errors raised while running scc and shaping its output.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    /// The scc binary could not be started at all.
    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// scc ran but reported failure (non-zero exit or empty output).
    #[error("{0}")]
    ToolFailed(String),

    #[error("scc timed out after {secs}s analyzing {path}")]
    Timeout { path: String, secs: u64 },

    /// scc output was not the expected JSON array of language groups.
    #[error("failed to parse scc output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no metrics found for {0}")]
    NoMetrics(String),
}

impl MetricsError {
    /// Faults are unexpected conditions the dispatcher reports as a generic
    /// failure; everything else is a regular, user-facing error message.
    pub fn is_fault(&self) -> bool {
        matches!(self, MetricsError::Parse(_))
    }
}

pub type MetricsResult<T> = Result<T, MetricsError>;
