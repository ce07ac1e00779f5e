use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::{info, warn};

use srsbench_common::config::DEFAULT_FILE_PATTERN;
use srsbench_common::{Metric, ReportConfig, Result};

use crate::export::{
    csv_field, summary_file_name, summary_header, summary_record, write_summary_file, write_table_file,
};
use crate::grouping::GroupingMode;
use crate::summary::{collect_dataset, rate_order, SummaryRow};

pub const COMBINED_CSV: &str = "combined_summary.csv";
pub const RATE_DIR: &str = "grouped_by_request_rate";
pub const RATE_CSV: &str = "grouped_metrics_by_request_rate.csv";

/// Rows of several datasets, side by side.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Datasets in configured order, including those that produced no rows.
    pub datasets: Vec<String>,
    /// Sorted by `(request_rate, dataset)`.
    pub rows: Vec<SummaryRow>,
    pub percentiles: Vec<f64>,
}

/// Figures one dataset reports at a given request rate, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateCell {
    pub ttft: Option<f64>,
    pub tpot: Option<f64>,
    pub throughput: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateRow {
    pub request_rate: f64,
    /// One entry per dataset, in [`Comparison::datasets`] order.
    pub cells: Vec<Option<RateCell>>,
}

/// Collect every configured dataset under `config.results_root`.
///
/// A dataset whose directory cannot be read is logged and contributes no rows.
pub fn load_comparison(config: &ReportConfig) -> Result<Comparison> {
    config.validate()?;

    let mut rows = Vec::new();
    for dataset in &config.datasets {
        let dir = config.results_root.join(&dataset.name);
        let mode = GroupingMode::from_grouped(dataset.grouped);
        match collect_dataset(&dir, &dataset.name, DEFAULT_FILE_PATTERN, mode, &config.percentiles) {
            Ok(dataset_rows) if dataset_rows.is_empty() => {
                warn!(dataset = %dataset.name, "no valid result files");
            }
            Ok(dataset_rows) => {
                info!(dataset = %dataset.name, mode = mode.as_name(), rows = dataset_rows.len(), "dataset loaded");
                rows.extend(dataset_rows);
            }
            Err(e) => warn!(dataset = %dataset.name, "skipping dataset: {e}"),
        }
    }

    rows.sort_by(|a, b| {
        rate_order(a.request_rate, b.request_rate).then_with(|| a.dataset.cmp(&b.dataset))
    });

    Ok(Comparison {
        datasets: config.datasets.iter().map(|d| d.name.clone()).collect(),
        rows,
        percentiles: config.percentiles.clone(),
    })
}

impl Comparison {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Pivot rows by request rate, one cell per dataset.
    ///
    /// When a dataset has several rows at the same rate the first one wins.
    pub fn by_request_rate(&self) -> Vec<RateRow> {
        let mut rates: Vec<f64> = self.rows.iter().filter_map(|r| r.request_rate).collect();
        rates.sort_by(f64::total_cmp);
        rates.dedup();

        rates
            .into_iter()
            .map(|rate| RateRow {
                request_rate: rate,
                cells: self
                    .datasets
                    .iter()
                    .map(|dataset| {
                        self.rows
                            .iter()
                            .find(|r| r.request_rate == Some(rate) && &r.dataset == dataset)
                            .map(|r| RateCell {
                                ttft: r.mean(Metric::Ttft).map(round2),
                                tpot: r.mean(Metric::Tpot).map(round2),
                                throughput: r.request_throughput.map(round2),
                            })
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn rate_header(&self) -> Vec<String> {
        let mut header = vec!["request_rate".to_string()];
        for dataset in &self.datasets {
            header.push(format!("{dataset}_ttft"));
            header.push(format!("{dataset}_tpot"));
            header.push(format!("{dataset}_throughput"));
        }
        header
    }

    pub fn rate_records(&self) -> Vec<Vec<String>> {
        self.by_request_rate()
            .iter()
            .map(|row| {
                let mut record = vec![row.request_rate.to_string()];
                for cell in &row.cells {
                    record.push(csv_field(cell.and_then(|c| c.ttft)));
                    record.push(csv_field(cell.and_then(|c| c.tpot)));
                    record.push(csv_field(cell.and_then(|c| c.throughput)));
                }
                record
            })
            .collect()
    }

    /// Write one summary CSV per dataset with rows, then the combined and the
    /// rate-pivoted CSVs, all under `output_dir`.
    pub fn write_outputs(&self, output_dir: &std::path::Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.datasets.len() + 2);
        for dataset in &self.datasets {
            let rows: Vec<SummaryRow> =
                self.rows.iter().filter(|r| &r.dataset == dataset).cloned().collect();
            if rows.is_empty() {
                continue;
            }
            let path = output_dir.join(summary_file_name(dataset));
            write_summary_file(&path, &rows, &self.percentiles)?;
            written.push(path);
        }

        let combined = output_dir.join(COMBINED_CSV);
        let records: Vec<Vec<String>> =
            self.rows.iter().map(|r| summary_record(r, &self.percentiles)).collect();
        write_table_file(&combined, &summary_header(&self.percentiles), &records)?;

        let by_rate = output_dir.join(RATE_DIR).join(RATE_CSV);
        write_table_file(&by_rate, &self.rate_header(), &self.rate_records())?;

        written.push(combined);
        written.push(by_rate);
        Ok(written)
    }

    /// Text table grouped by request rate, one line per dataset.
    pub fn render_rate_table(&self) -> String {
        let mut out = String::new();
        let header = format!(
            "{:<12} {:<15} {:<10} {:<10} {:<10}",
            "Request Rate", "Dataset", "Throughput", "TTFT", "TPOT"
        );
        let rule = "-".repeat(header.len());
        let _ = writeln!(out, "{}", header.trim_end());
        let _ = writeln!(out, "{rule}");

        for row in self.by_request_rate() {
            for (i, (dataset, cell)) in self.datasets.iter().zip(&row.cells).enumerate() {
                let rate = if i == 0 { row.request_rate.to_string() } else { String::new() };
                let line = format!(
                    "{:<12} {:<15} {:<10} {:<10} {:<10}",
                    rate,
                    dataset,
                    dash_opt(cell.and_then(|c| c.throughput)),
                    dash_opt(cell.and_then(|c| c.ttft)),
                    dash_opt(cell.and_then(|c| c.tpot)),
                );
                let _ = writeln!(out, "{}", line.trim_end());
            }
            let _ = writeln!(out, "{rule}");
        }
        out
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn dash_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
