use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use srsbench_common::{BenchError, Metric, Result};

use crate::compare::Comparison;
use crate::summary::SummaryRow;

pub const CHART_SIZE: (u32, u32) = (1000, 600);

/// Metrics charted against request throughput.
pub const CHART_METRICS: [Metric; 2] = [Metric::Ttft, Metric::Tpot];

/// One line on a throughput chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    /// `(request_throughput, mean latency in ms)`.
    pub points: Vec<(f64, f64)>,
}

/// Throughput against the mean of `metric`, in row order.
///
/// Rows lacking either value are left out.
pub fn throughput_series(label: &str, rows: &[SummaryRow], metric: Metric) -> Series {
    Series {
        label: label.to_string(),
        points: rows
            .iter()
            .filter_map(|row| Some((row.request_throughput?, row.mean(metric)?)))
            .collect(),
    }
}

/// Draw `series` as a PNG line chart at `path`.
///
/// Returns `false`, writing nothing, when no series has a point. Caption, axis
/// labels and legend are only rendered with the `ttf` feature.
pub fn draw_chart(path: &Path, title: &str, metric: Metric, series: &[Series]) -> Result<bool> {
    let series: Vec<&Series> = series.iter().filter(|s| !s.points.is_empty()).collect();
    if series.is_empty() {
        debug!(path = %path.display(), "no points to chart");
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| BenchError::io(parent, e))?;
    }

    let points = || series.iter().flat_map(|s| s.points.iter().copied());
    let x_range = axis_range(points().map(|(x, _)| x));
    let y_range = axis_range(points().map(|(_, y)| y));

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_error(path, e))?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    #[cfg(feature = "ttf")]
    builder
        .caption(title, ("sans-serif", 28))
        .x_label_area_size(40)
        .y_label_area_size(60);
    let mut chart = builder
        .build_cartesian_2d(x_range, y_range)
        .map_err(|e| plot_error(path, e))?;

    let mut mesh = chart.configure_mesh();
    #[cfg(feature = "ttf")]
    mesh.x_desc("Request Throughput (req/s)")
        .y_desc(format!("Mean {} (ms)", metric.display_name()));
    // Without a font backend no text may be drawn.
    #[cfg(not(feature = "ttf"))]
    mesh.x_labels(0).y_labels(0);
    mesh.draw().map_err(|e| plot_error(path, e))?;

    for (idx, line) in series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        chart
            .draw_series(LineSeries::new(line.points.iter().copied(), color.stroke_width(2)))
            .map_err(|e| plot_error(path, e))?
            .label(line.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
        chart
            .draw_series(line.points.iter().map(|&p| Circle::new(p, 4, color.filled())))
            .map_err(|e| plot_error(path, e))?;
    }

    #[cfg(feature = "ttf")]
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| plot_error(path, e))?;
    root.present().map_err(|e| plot_error(path, e))?;

    info!(
        path = %path.display(),
        title,
        metric = metric.as_name(),
        lines = series.len(),
        "chart written"
    );
    Ok(true)
}

/// `<dataset>_ttft.png` and `<dataset>_tpot.png` for one dataset's rows.
pub fn plot_dataset(output_dir: &Path, dataset: &str, rows: &[SummaryRow]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for metric in CHART_METRICS {
        let path = output_dir.join(format!("{dataset}_{}.png", metric.as_name()));
        let title = format!("Throughput vs Mean {} ({dataset})", metric.display_name());
        if draw_chart(&path, &title, metric, &[throughput_series(dataset, rows, metric)])? {
            written.push(path);
        }
    }
    Ok(written)
}

/// `comparison_ttft.png` and `comparison_tpot.png`, one line per dataset.
pub fn plot_comparison(output_dir: &Path, comparison: &Comparison) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for metric in CHART_METRICS {
        let series: Vec<Series> = comparison
            .datasets
            .iter()
            .map(|dataset| {
                let rows: Vec<SummaryRow> =
                    comparison.rows.iter().filter(|r| &r.dataset == dataset).cloned().collect();
                throughput_series(dataset, &rows, metric)
            })
            .collect();
        let path = output_dir.join(format!("comparison_{}.png", metric.as_name()));
        let title = format!("Throughput vs Mean {}", metric.display_name());
        if draw_chart(&path, &title, metric, &series)? {
            written.push(path);
        }
    }
    Ok(written)
}

/// Data bounds padded by 5%, widened around a single value.
fn axis_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = if hi > lo { (hi - lo) * 0.05 } else { lo.abs().max(1.0) * 0.1 };
    (lo - pad)..(hi + pad)
}

fn plot_error(path: &Path, err: impl std::fmt::Display) -> BenchError {
    BenchError::Plot { path: path.display().to_string(), message: err.to_string() }
}
