use crate::state::Metric;
use thiserror::Error;

/// Top-level error type used across the entire application.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The sensor or counter simply does not exist on this host.
    /// Callers degrade to a sentinel value and keep sampling.
    #[error("{metric} is unavailable on this host")]
    Unavailable { metric: Metric },

    /// An OS query failed on a single tick. The metric is skipped for
    /// this tick only; the scheduler keeps running.
    #[error("transient {metric} read failure: {reason}")]
    Transient { metric: Metric, reason: String },

    /// The initial network counter baseline could not be established.
    /// Surfaced to the caller; the sampler never starts.
    #[error("sampler init failed: {0}")]
    Init(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl MonitorError {
    pub fn transient(metric: Metric, reason: impl ToString) -> Self {
        Self::Transient {
            metric,
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = MonitorError> = std::result::Result<T, E>;
