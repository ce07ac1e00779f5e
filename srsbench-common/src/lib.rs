use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;

pub use config::{DatasetConfig, ReportConfig};

/// Raw latency arrays in vLLM result files are recorded in seconds.
pub const MS_PER_SECOND: f64 = 1_000.0;

/// Percentiles reported when the caller does not ask for specific ones.
pub const DEFAULT_PERCENTILES: [f64; 2] = [99.0, 99.99];

/// Error types for srsbench operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BenchError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Replica group {0:?} has no results")]
    EmptyGroup(String),

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Malformed result file {file}: {reason}")]
    MalformedResult { file: String, reason: String },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Chart error on {path}: {message}")]
    Plot { path: String, message: String },
}

impl BenchError {
    pub fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        BenchError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for srsbench operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// Latency observation types recorded per request by the benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Time to first token.
    Ttft,
    /// Time per output token, excluding the first.
    Tpot,
    /// Inter-token latency.
    Itl,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Ttft, Metric::Tpot, Metric::Itl];

    pub fn as_name(&self) -> &'static str {
        match self {
            Metric::Ttft => "ttft",
            Metric::Tpot => "tpot",
            Metric::Itl => "itl",
        }
    }

    /// JSON field holding the per-request observations, in seconds.
    pub fn samples_field(&self) -> &'static str {
        match self {
            Metric::Ttft => "ttfts",
            Metric::Tpot => "tpots",
            Metric::Itl => "itls",
        }
    }

    /// JSON field holding the benchmark's own mean, already in milliseconds.
    pub fn mean_field(&self) -> &'static str {
        match self {
            Metric::Ttft => "mean_ttft_ms",
            Metric::Tpot => "mean_tpot_ms",
            Metric::Itl => "mean_itl_ms",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Metric::Ttft => "TTFT",
            Metric::Tpot => "TPOT",
            Metric::Itl => "ITL",
        }
    }
}

/// Column label for a percentile: `99.0` becomes `p99`, `99.99` becomes `p99.99`.
pub fn percentile_label(p: f64) -> String {
    format!("p{p}")
}
