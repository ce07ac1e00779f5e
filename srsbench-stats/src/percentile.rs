use srsbench_common::{BenchError, Result, MS_PER_SECOND};

/// Linear-interpolation ("R-7") percentile of `samples`, with `p` in `[0, 100]`.
///
/// Returns `Ok(None)` for an empty slice so that a missing value can never be
/// mistaken for a zero latency downstream. `samples` is left untouched; an
/// ascending copy is sorted instead, so the result does not depend on input order.
pub fn compute_percentile(samples: &[f64], p: f64) -> Result<Option<f64>> {
    if !(0.0..=100.0).contains(&p) {
        return Err(BenchError::InvalidArgument(format!(
            "percentile {p} is outside [0, 100]"
        )));
    }
    if samples.is_empty() {
        return Ok(None);
    }

    let mut sorted = samples.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);

    let n = sorted.len();
    let rank = (n - 1) as f64 * p / 100.0;
    let lower = rank.floor() as usize;
    let frac = rank - lower as f64;

    if frac == 0.0 || lower + 1 >= n {
        return Ok(Some(sorted[lower]));
    }
    Ok(Some(interpolate(sorted[lower], sorted[lower + 1], frac)))
}

fn interpolate(lo: f64, hi: f64, frac: f64) -> f64 {
    let gap = hi - lo;
    if gap.is_finite() {
        lo + frac * gap
    } else {
        // Endpoints far enough apart that their difference overflows.
        lo * (1.0 - frac) + hi * frac
    }
}

/// Latency observations for one metric, in milliseconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet(Vec<f64>);

impl SampleSet {
    pub fn from_millis(samples: Vec<f64>) -> Self {
        SampleSet(samples)
    }

    /// Convert raw benchmark observations (seconds) to milliseconds.
    pub fn from_seconds(samples: impl IntoIterator<Item = f64>) -> Self {
        SampleSet(samples.into_iter().map(|s| s * MS_PER_SECOND).collect())
    }

    /// Union of several sets, keeping every observation.
    pub fn concat<'a>(sets: impl IntoIterator<Item = &'a SampleSet>) -> Self {
        SampleSet(sets.into_iter().flat_map(|s| s.0.iter().copied()).collect())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn percentile(&self, p: f64) -> Result<Option<f64>> {
        compute_percentile(&self.0, p)
    }
}
