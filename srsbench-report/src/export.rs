use std::io::Write;
use std::path::Path;
use tracing::info;

use srsbench_common::{percentile_label, BenchError, Metric, Result};

use crate::summary::SummaryRow;

/// File name of a dataset's summary CSV.
pub fn summary_file_name(dataset: &str) -> String {
    format!("{dataset}_summary.csv")
}

/// Header of the per-row summary CSV.
pub fn summary_header(percentiles: &[f64]) -> Vec<String> {
    let mut header: Vec<String> = [
        "dataset",
        "filename",
        "replicas",
        "request_rate",
        "request_throughput",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    header.extend(Metric::ALL.iter().map(|m| m.mean_field().to_string()));
    for &p in percentiles {
        for metric in Metric::ALL {
            header.push(format!("{}_{}_ms", percentile_label(p), metric.as_name()));
        }
    }
    header.extend(Metric::ALL.iter().map(|m| format!("{}_source", m.as_name())));
    header
}

/// One CSV record, aligned with [`summary_header`]. Missing values are empty.
pub fn summary_record(row: &SummaryRow, percentiles: &[f64]) -> Vec<String> {
    let mut record = vec![
        row.dataset.clone(),
        row.filename.clone(),
        row.replicas.to_string(),
        csv_field(row.request_rate),
        csv_field(row.request_throughput),
    ];
    record.extend(Metric::ALL.iter().map(|&m| csv_field(row.mean(m))));
    for &p in percentiles {
        for metric in Metric::ALL {
            record.push(csv_field(row.percentile(p, metric)));
        }
    }
    record.extend(Metric::ALL.iter().map(|&m| row.source(m).as_name().to_string()));
    record
}

pub fn write_summary_csv<W: Write>(writer: W, rows: &[SummaryRow], percentiles: &[f64]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(summary_header(percentiles)).map_err(csv_error)?;
    for row in rows {
        csv.write_record(summary_record(row, percentiles)).map_err(csv_error)?;
    }
    csv.flush().map_err(|e| BenchError::Csv(e.to_string()))
}

pub fn write_summary_file(path: &Path, rows: &[SummaryRow], percentiles: &[f64]) -> Result<()> {
    let file = create_file(path)?;
    write_summary_csv(file, rows, percentiles)?;
    info!(path = %path.display(), rows = rows.len(), "summary written");
    Ok(())
}

/// Write an already-tabulated CSV (header plus records) to `path`.
pub fn write_table_file(path: &Path, header: &[String], records: &[Vec<String>]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(create_file(path)?);
    csv.write_record(header).map_err(csv_error)?;
    for record in records {
        csv.write_record(record).map_err(csv_error)?;
    }
    csv.flush().map_err(|e| BenchError::io(path, e))?;
    info!(path = %path.display(), rows = records.len(), "table written");
    Ok(())
}

/// Full-precision CSV cell; empty for a missing value, never `0`.
pub fn csv_field(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn create_file(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| BenchError::io(parent, e))?;
    }
    std::fs::File::create(path).map_err(|e| BenchError::io(path, e))
}

fn csv_error(err: csv::Error) -> BenchError {
    BenchError::Csv(err.to_string())
}
