use std::collections::BTreeMap;

use srsbench_common::{BenchError, Metric, Result};

use crate::percentile::SampleSet;

/// Everything one result file contributes: scalar metrics plus raw observations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplicaResult {
    pub name: String,
    pub request_rate: Option<f64>,
    pub request_throughput: Option<f64>,
    /// `mean_<metric>_ms` as reported by the benchmark itself.
    pub mean_ms: BTreeMap<Metric, f64>,
    /// Raw per-request observations, already converted to milliseconds.
    pub samples_ms: BTreeMap<Metric, SampleSet>,
}

impl ReplicaResult {
    pub fn samples(&self, metric: Metric) -> Option<&SampleSet> {
        self.samples_ms.get(&metric).filter(|s| !s.is_empty())
    }
}

/// Which data a grouped figure for a metric was actually computed from.
///
/// Raw-sample percentiles and averaged per-replica means answer different
/// questions; reports carry this tag so the two are never mixed silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricSource {
    /// Percentiles come from the union of this many raw observations.
    RawSamples { count: usize },
    /// No raw observations; only the mean averaged over this many replicas exists.
    ReplicaMeans { replicas: usize },
    Missing,
}

impl MetricSource {
    pub fn as_name(&self) -> &'static str {
        match self {
            MetricSource::RawSamples { .. } => "samples",
            MetricSource::ReplicaMeans { .. } => "means",
            MetricSource::Missing => "missing",
        }
    }
}

/// One logical benchmark configuration after merging its replicas.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedResult {
    pub name: String,
    pub replicas: usize,
    /// Sum over replicas: each replica served a partition of the load.
    pub request_rate: Option<f64>,
    pub request_throughput: Option<f64>,
    /// Unweighted average of the replicas' own means.
    pub mean_ms: BTreeMap<Metric, f64>,
    /// Number of replicas that reported each mean.
    mean_replicas: BTreeMap<Metric, usize>,
    pub samples_ms: BTreeMap<Metric, SampleSet>,
}

impl GroupedResult {
    pub fn source(&self, metric: Metric) -> MetricSource {
        if let Some(samples) = self.samples_ms.get(&metric).filter(|s| !s.is_empty()) {
            return MetricSource::RawSamples { count: samples.len() };
        }
        match self.mean_replicas.get(&metric) {
            Some(&replicas) => MetricSource::ReplicaMeans { replicas },
            None => MetricSource::Missing,
        }
    }

    /// Percentile over the union of raw observations.
    ///
    /// `Ok(None)` when no replica supplied raw samples for `metric`; the
    /// averaged mean is never substituted.
    pub fn percentile(&self, metric: Metric, p: f64) -> Result<Option<f64>> {
        match self.samples_ms.get(&metric) {
            Some(samples) => samples.percentile(p),
            None => SampleSet::default().percentile(p),
        }
    }

    pub fn mean(&self, metric: Metric) -> Option<f64> {
        self.mean_ms.get(&metric).copied()
    }
}

/// Merge the results of replicas serving one data-parallel configuration.
///
/// `replicas` maps replica identifier (e.g. the server port) to its result.
/// Rates and throughputs are summed, means are averaged, raw samples are
/// concatenated. Replicas missing a scalar or a sample set are left out of that
/// aggregate only.
pub fn merge_group(name: &str, replicas: &BTreeMap<String, ReplicaResult>) -> Result<GroupedResult> {
    if replicas.is_empty() {
        return Err(BenchError::EmptyGroup(name.to_string()));
    }

    let request_rate = sum_present(replicas.values().map(|r| r.request_rate));
    let request_throughput = sum_present(replicas.values().map(|r| r.request_throughput));

    let mut mean_ms = BTreeMap::new();
    let mut mean_replicas = BTreeMap::new();
    let mut samples_ms = BTreeMap::new();

    for metric in Metric::ALL {
        let means: Vec<f64> = replicas
            .values()
            .filter_map(|r| r.mean_ms.get(&metric).copied())
            .filter(|m| m.is_finite())
            .collect();
        if !means.is_empty() {
            mean_ms.insert(metric, means.iter().sum::<f64>() / means.len() as f64);
            mean_replicas.insert(metric, means.len());
        }

        let merged = SampleSet::concat(replicas.values().filter_map(|r| r.samples(metric)));
        if !merged.is_empty() {
            samples_ms.insert(metric, merged);
        }
    }

    Ok(GroupedResult {
        name: name.to_string(),
        replicas: replicas.len(),
        request_rate,
        request_throughput,
        mean_ms,
        mean_replicas,
        samples_ms,
    })
}

fn sum_present(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    values
        .flatten()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}
