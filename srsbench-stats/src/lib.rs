pub mod merge;
pub mod percentile;

pub use merge::{merge_group, GroupedResult, MetricSource, ReplicaResult};
pub use percentile::{compute_percentile, SampleSet};
