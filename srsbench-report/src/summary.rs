use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use srsbench_common::{percentile_label, Metric, Result};
use srsbench_stats::{GroupedResult, MetricSource};

use crate::grouping::{build_groups, GroupingMode};
use crate::ingest::load_directory;

/// A percentile figure together with the data it was computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentileCell {
    pub percentile: f64,
    pub metric: Metric,
    /// `None` when no raw observations were available.
    pub value: Option<f64>,
}

/// One output row: a single result file, or a merged replica group.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub dataset: String,
    pub filename: String,
    pub replicas: usize,
    pub request_rate: Option<f64>,
    pub request_throughput: Option<f64>,
    pub mean_ms: BTreeMap<Metric, f64>,
    pub percentiles: Vec<PercentileCell>,
    pub sources: BTreeMap<Metric, MetricSource>,
}

impl SummaryRow {
    pub fn from_group(dataset: &str, group: &GroupedResult, percentiles: &[f64]) -> Result<Self> {
        let mut cells = Vec::with_capacity(percentiles.len() * Metric::ALL.len());
        for &percentile in percentiles {
            for metric in Metric::ALL {
                let value = group.percentile(metric, percentile)?;
                cells.push(PercentileCell { percentile, metric, value });
            }
        }

        Ok(SummaryRow {
            dataset: dataset.to_string(),
            filename: group.name.clone(),
            replicas: group.replicas,
            request_rate: group.request_rate,
            request_throughput: group.request_throughput,
            mean_ms: Metric::ALL
                .iter()
                .filter_map(|&m| group.mean(m).map(|v| (m, v)))
                .collect(),
            percentiles: cells,
            sources: Metric::ALL.iter().map(|&m| (m, group.source(m))).collect(),
        })
    }

    pub fn mean(&self, metric: Metric) -> Option<f64> {
        self.mean_ms.get(&metric).copied()
    }

    pub fn percentile(&self, percentile: f64, metric: Metric) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|c| c.percentile == percentile && c.metric == metric)
            .and_then(|c| c.value)
    }

    pub fn source(&self, metric: Metric) -> MetricSource {
        self.sources.get(&metric).copied().unwrap_or(MetricSource::Missing)
    }
}

/// Ascending by request rate; rows without a rate sort last.
pub fn sort_by_rate(rows: &mut [SummaryRow]) {
    rows.sort_by(|a, b| rate_order(a.request_rate, b.request_rate));
}

pub fn rate_order(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn summarize(dataset: &str, groups: &[GroupedResult], percentiles: &[f64]) -> Result<Vec<SummaryRow>> {
    let mut rows = groups
        .iter()
        .map(|g| SummaryRow::from_group(dataset, g, percentiles))
        .collect::<Result<Vec<_>>>()?;
    sort_by_rate(&mut rows);
    Ok(rows)
}

/// Ingest, group and summarize every matching result file in `dir`.
pub fn collect_dataset(
    dir: &Path,
    dataset: &str,
    pattern: &str,
    mode: GroupingMode,
    percentiles: &[f64],
) -> Result<Vec<SummaryRow>> {
    let results = load_directory(dir, pattern)?;
    let groups = build_groups(results, mode)?;
    summarize(dataset, &groups, percentiles)
}

/// Human-readable table of `rows`, one line per row.
pub fn render_table(rows: &[SummaryRow], percentiles: &[f64]) -> String {
    let mut headers = vec![
        "Filename".to_string(),
        "Rate (req/s)".to_string(),
        "Throughput".to_string(),
    ];
    for metric in [Metric::Ttft, Metric::Tpot] {
        headers.push(format!("Mean {} (ms)", metric.display_name()));
        for &p in percentiles {
            headers.push(format!("{} {} (ms)", percentile_label(p).to_uppercase(), metric.display_name()));
        }
    }

    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells = vec![
                row.filename.clone(),
                fmt_opt(row.request_rate),
                fmt_opt(row.request_throughput),
            ];
            for metric in [Metric::Ttft, Metric::Tpot] {
                cells.push(fmt_opt(row.mean(metric)));
                for &p in percentiles {
                    cells.push(fmt_opt(row.percentile(p, metric)));
                }
            }
            cells
        })
        .collect();

    let widths: Vec<usize> = (0..headers.len())
        .map(|i| {
            body.iter()
                .map(|cells| cells[i].len())
                .chain(std::iter::once(headers[i].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header_line = join_padded(&headers, &widths);
    let _ = writeln!(out, "{header_line}");
    let _ = writeln!(out, "{}", "-".repeat(header_line.len()));
    for cells in &body {
        let _ = writeln!(out, "{}", join_padded(cells, &widths));
    }
    out
}

fn join_padded(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

pub fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "N/A".to_string(),
    }
}
