use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, warn};

use srsbench_common::{BenchError, Metric, Result};
use srsbench_stats::{ReplicaResult, SampleSet};

const REQUEST_RATE: &str = "request_rate";
const REQUEST_THROUGHPUT: &str = "request_throughput";
const OUTPUT_LENS: &str = "output_lens";

/// Top-level fields of a vLLM `benchmark_serving` result file.
///
/// Values are loosely typed and validated one by one; result files carry
/// strings such as `"inf"` where numbers are expected.
struct RawResult(Map<String, Value>);

impl RawResult {
    fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    fn mean(&self, metric: Metric) -> Option<&Value> {
        self.field(metric.mean_field())
    }

    fn samples(&self, metric: Metric) -> Option<&Value> {
        self.field(metric.samples_field())
    }
}

/// Parse one result file's JSON into a [`ReplicaResult`].
///
/// Raw observations are filtered (non-numeric, non-finite and negative entries
/// are dropped) and converted from seconds to milliseconds here, so nothing
/// downstream ever rescales them. A file without a numeric `request_rate`
/// cannot be placed on the rate axis and is rejected.
pub fn parse_result(name: &str, json: &str) -> Result<ReplicaResult> {
    let fields: Map<String, Value> =
        serde_json::from_str(json).map_err(|e| malformed(name, e.to_string()))?;
    let raw = RawResult(fields);

    let request_rate = raw
        .field(REQUEST_RATE)
        .and_then(finite_number)
        .ok_or_else(|| malformed(name, "request_rate is missing or not numeric".to_string()))?;

    let mut result = ReplicaResult {
        name: name.to_string(),
        request_rate: Some(request_rate),
        request_throughput: raw.field(REQUEST_THROUGHPUT).and_then(finite_number),
        ..Default::default()
    };

    for metric in Metric::ALL {
        if let Some(mean) = raw.mean(metric).and_then(finite_number) {
            result.mean_ms.insert(metric, mean);
        }
        let seconds = match (metric, raw.samples(metric)) {
            (_, Some(values)) => observations(values),
            (Metric::Tpot, None) => {
                derive_tpots(name, raw.samples(Metric::Itl), raw.field(OUTPUT_LENS))
            }
            (_, None) => Vec::new(),
        };
        if !seconds.is_empty() {
            result.samples_ms.insert(metric, SampleSet::from_seconds(seconds));
        }
    }

    debug!(
        file = name,
        request_rate,
        ttft_samples = result.samples(Metric::Ttft).map_or(0, SampleSet::len),
        "parsed result file"
    );
    Ok(result)
}

pub fn load_result(path: &Path) -> Result<ReplicaResult> {
    let json = std::fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;
    parse_result(&file_name(path), &json)
}

/// Load every result file in `dir` whose name matches `pattern`, in file-name order.
///
/// Files that fail to parse are logged and skipped; only an unreadable
/// directory is an error.
pub fn load_directory(dir: &Path, pattern: &str) -> Result<Vec<ReplicaResult>> {
    let entries = std::fs::read_dir(dir).map_err(|e| BenchError::io(dir, e))?;

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && matches_pattern(&file_name(path), pattern))
        .collect();
    paths.sort();

    let mut results = Vec::with_capacity(paths.len());
    for path in paths {
        match load_result(&path) {
            Ok(result) => results.push(result),
            Err(e) => warn!(path = %path.display(), "skipping result file: {e}"),
        }
    }
    Ok(results)
}

/// Shell-style match where `*` stands for any run of characters.
pub fn matches_pattern(name: &str, pattern: &str) -> bool {
    let mut parts = pattern.split('*');
    let first = parts.next().unwrap_or_default();
    let Some(mut rest) = name.strip_prefix(first) else {
        return false;
    };
    let tail: Vec<&str> = parts.collect();
    let Some((last, middle)) = tail.split_last() else {
        // No wildcard at all: exact match.
        return rest.is_empty();
    };
    for part in middle {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn malformed(name: &str, reason: String) -> BenchError {
    BenchError::MalformedResult { file: name.to_string(), reason }
}

fn finite_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

fn observation(value: &Value) -> Option<f64> {
    finite_number(value).filter(|v| *v >= 0.0)
}

/// Flatten a flat or per-request nested array of observations in seconds.
fn observations(value: &Value) -> Vec<f64> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .flat_map(|item| match item.as_array() {
            Some(inner) => inner.iter().filter_map(observation).collect::<Vec<_>>(),
            None => observation(item).into_iter().collect(),
        })
        .collect()
}

/// Per-request TPOT in seconds from per-request inter-token latencies.
///
/// Result files without a `tpots` array still carry `itls` (one list per
/// request) and `output_lens`; the decode time is the sum of a request's ITLs,
/// spread over every output token after the first. Requests with fewer than
/// two output tokens have no TPOT. Only requests present in both arrays are
/// used.
fn derive_tpots(name: &str, itls: Option<&Value>, output_lens: Option<&Value>) -> Vec<f64> {
    let (Some(itls), Some(lens)) = (itls.and_then(Value::as_array), output_lens.and_then(Value::as_array))
    else {
        return Vec::new();
    };
    if itls.len() != lens.len() {
        warn!(
            file = name,
            itls = itls.len(),
            output_lens = lens.len(),
            "itls and output_lens differ in length; unpaired requests get no TPOT"
        );
    }
    itls.iter()
        .zip(lens)
        .filter_map(|(request_itls, len)| {
            let tokens = len.as_u64().filter(|n| *n > 1)?;
            let decode: Vec<f64> = request_itls
                .as_array()?
                .iter()
                .map(observation)
                .collect::<Option<_>>()?;
            Some(decode.iter().sum::<f64>() / (tokens - 1) as f64)
        })
        .collect()
}
