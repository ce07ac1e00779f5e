use std::collections::BTreeMap;

use srsbench_common::Result;
use srsbench_stats::{merge_group, GroupedResult, ReplicaResult};

/// How the result files of one dataset map onto report rows.
///
/// | Mode     | Row per                        | Row label             |
/// |----------|--------------------------------|-----------------------|
/// | Standard | result file                    | file name             |
/// | Grouped  | `<base>-<replica>.json` family | `<base> (combined)`   |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingMode {
    Standard,
    Grouped,
}

impl GroupingMode {
    pub fn as_name(&self) -> &'static str {
        match self {
            GroupingMode::Standard => "standard",
            GroupingMode::Grouped => "grouped",
        }
    }

    pub fn from_grouped(grouped: bool) -> Self {
        if grouped {
            GroupingMode::Grouped
        } else {
            GroupingMode::Standard
        }
    }
}

/// Split a result file name into `(base, replica_id)` at its last `-`.
///
/// `vllm-10qps-8000.json` → `("vllm-10qps", "8000")`. A name without `-` is a
/// group of its own with an empty replica id.
pub fn replica_key(file_name: &str) -> (String, String) {
    match file_name.rsplit_once('-') {
        Some((base, suffix)) => {
            let replica = suffix.strip_suffix(".json").unwrap_or(suffix);
            (base.to_string(), replica.to_string())
        }
        None => (file_name.to_string(), String::new()),
    }
}

/// Bucket results by replica base name, then by replica id.
pub fn group_by_replica(
    results: Vec<ReplicaResult>,
) -> BTreeMap<String, BTreeMap<String, ReplicaResult>> {
    let mut groups: BTreeMap<String, BTreeMap<String, ReplicaResult>> = BTreeMap::new();
    for result in results {
        let (base, replica) = replica_key(&result.name);
        groups.entry(base).or_default().insert(replica, result);
    }
    groups
}

/// Turn a dataset's results into one [`GroupedResult`] per report row.
pub fn build_groups(results: Vec<ReplicaResult>, mode: GroupingMode) -> Result<Vec<GroupedResult>> {
    match mode {
        GroupingMode::Standard => results
            .into_iter()
            .map(|result| {
                let name = result.name.clone();
                let single = BTreeMap::from([(String::new(), result)]);
                merge_group(&name, &single)
            })
            .collect(),
        GroupingMode::Grouped => group_by_replica(results)
            .iter()
            .map(|(base, replicas)| merge_group(&format!("{base} (combined)"), replicas))
            .collect(),
    }
}
