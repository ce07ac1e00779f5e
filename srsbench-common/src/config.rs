use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{BenchError, Result, DEFAULT_PERCENTILES};

/// File-name pattern matched when collecting a single result directory.
pub const DEFAULT_FILE_PATTERN: &str = "*.json";

/// Where comparison outputs go when no directory is configured.
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// One dataset (a sub-directory of the results root) taking part in a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    /// Merge `<base>-<replica>.json` files into one row per base name.
    #[serde(default)]
    pub grouped: bool,
}

impl DatasetConfig {
    /// Parse a `name` or `name:grouped` command-line value.
    pub fn parse(value: &str) -> Result<Self> {
        match value.split_once(':') {
            None if !value.is_empty() => Ok(Self { name: value.to_string(), grouped: false }),
            Some((name, "grouped")) if !name.is_empty() => {
                Ok(Self { name: name.to_string(), grouped: true })
            }
            Some((name, "standard")) if !name.is_empty() => {
                Ok(Self { name: name.to_string(), grouped: false })
            }
            _ => Err(BenchError::Config(format!(
                "dataset {value:?} must be NAME, NAME:grouped or NAME:standard"
            ))),
        }
    }
}

/// Comparison run configuration, usually loaded from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub results_root: PathBuf,
    pub datasets: Vec<DatasetConfig>,
    #[serde(default = "default_percentiles")]
    pub percentiles: Vec<f64>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_percentiles() -> Vec<f64> {
    DEFAULT_PERCENTILES.to_vec()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

impl ReportConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ReportConfig =
            serde_json::from_str(json).map_err(|e| BenchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that could only produce an empty or ambiguous report.
    pub fn validate(&self) -> Result<()> {
        if self.datasets.is_empty() {
            return Err(BenchError::Config("at least one dataset is required".to_string()));
        }
        for (i, dataset) in self.datasets.iter().enumerate() {
            if self.datasets[..i].iter().any(|d| d.name == dataset.name) {
                return Err(BenchError::Config(format!("dataset {:?} listed twice", dataset.name)));
            }
        }
        validate_percentiles(&self.percentiles)
    }
}

/// Every percentile must be a finite value in `[0, 100]`.
pub fn validate_percentiles(percentiles: &[f64]) -> Result<()> {
    if percentiles.is_empty() {
        return Err(BenchError::Config("at least one percentile is required".to_string()));
    }
    match percentiles.iter().find(|p| !(0.0..=100.0).contains(*p)) {
        Some(p) => Err(BenchError::InvalidArgument(format!(
            "percentile {p} is outside [0, 100]"
        ))),
        None => Ok(()),
    }
}
