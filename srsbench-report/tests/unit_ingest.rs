use srsbench_common::{BenchError, Metric};
use srsbench_report::ingest::{load_directory, matches_pattern, parse_result};
use std::fs;

#[test]
fn test_parse_scalars_and_convert_samples_to_ms() {
    let json = r#"{
        "request_rate": 10.0,
        "request_throughput": 9.5,
        "mean_ttft_ms": 120.5,
        "mean_tpot_ms": 20.25,
        "ttfts": [0.1, 0.25, 0.05],
        "tpots": [0.02, 0.021]
    }"#;
    let r = parse_result("vllm-10qps.json", json).unwrap();

    assert_eq!(r.name, "vllm-10qps.json");
    assert_eq!(r.request_rate, Some(10.0));
    assert_eq!(r.request_throughput, Some(9.5));
    assert_eq!(r.mean_ms.get(&Metric::Ttft), Some(&120.5));
    assert_eq!(r.mean_ms.get(&Metric::Tpot), Some(&20.25));
    assert_eq!(r.mean_ms.get(&Metric::Itl), None);
    assert_eq!(r.samples(Metric::Ttft).unwrap().as_slice(), &[100.0, 250.0, 50.0]);
    assert_eq!(r.samples(Metric::Tpot).unwrap().as_slice(), &[20.0, 21.0]);
    assert!(r.samples(Metric::Itl).is_none());
}

#[test]
fn test_malformed_sample_entries_are_dropped() {
    let json = r#"{
        "request_rate": 1,
        "ttfts": [0.5, "oops", null, -1.0, 0.25, {"x": 1}]
    }"#;
    let r = parse_result("f.json", json).unwrap();
    assert_eq!(r.samples(Metric::Ttft).unwrap().as_slice(), &[500.0, 250.0]);
}

#[test]
fn test_nested_itls_are_flattened() {
    let json = r#"{"request_rate": 2, "itls": [[0.01, 0.02], [], [0.03]]}"#;
    let r = parse_result("f.json", json).unwrap();
    assert_eq!(r.samples(Metric::Itl).unwrap().as_slice(), &[10.0, 20.0, 30.0]);
}

#[test]
fn test_tpot_derived_from_itls_when_absent() {
    // request 1: 3 output tokens, ITLs sum 0.04 s → 0.02 s per token
    // request 2: 1 output token → no TPOT
    let json = r#"{
        "request_rate": 2,
        "output_lens": [3, 1],
        "itls": [[0.015, 0.025], []]
    }"#;
    let r = parse_result("f.json", json).unwrap();
    let tpots = r.samples(Metric::Tpot).unwrap().as_slice().to_vec();
    assert_eq!(tpots.len(), 1);
    assert!((tpots[0] - 20.0).abs() < 1e-9, "got {}", tpots[0]);
}

#[test]
fn test_tpot_derivation_with_mismatched_lengths_uses_paired_requests() {
    // three ITL lists but only two output lengths: the third request is unpaired
    let json = r#"{
        "request_rate": 2,
        "output_lens": [3, 2],
        "itls": [[0.015, 0.025], [0.03], [0.5, 0.5]]
    }"#;
    let r = parse_result("f.json", json).unwrap();
    let tpots = r.samples(Metric::Tpot).unwrap().as_slice().to_vec();
    assert_eq!(tpots.len(), 2);
    assert!((tpots[0] - 20.0).abs() < 1e-9, "got {}", tpots[0]);
    assert!((tpots[1] - 30.0).abs() < 1e-9, "got {}", tpots[1]);
    assert_eq!(r.samples(Metric::Itl).unwrap().len(), 5);
}

#[test]
fn test_non_object_json_is_malformed() {
    assert!(matches!(parse_result("f.json", "[1, 2]"), Err(BenchError::MalformedResult { .. })));
}

#[test]
fn test_non_numeric_scalars_become_none() {
    let json = r#"{"request_rate": 4, "request_throughput": "n/a", "mean_ttft_ms": null}"#;
    let r = parse_result("f.json", json).unwrap();
    assert_eq!(r.request_throughput, None);
    assert!(r.mean_ms.is_empty());
    assert!(r.samples_ms.is_empty());
}

#[test]
fn test_missing_or_infinite_request_rate_is_rejected() {
    for json in [r#"{}"#, r#"{"request_rate": "inf"}"#, r#"{"request_rate": null}"#] {
        let err = parse_result("vllm-inf.json", json).unwrap_err();
        assert!(
            matches!(&err, BenchError::MalformedResult { file, reason } if file == "vllm-inf.json" && reason.contains("request_rate")),
            "{json}: {err}"
        );
    }
}

#[test]
fn test_invalid_json_is_malformed() {
    assert!(matches!(parse_result("f.json", "{not json"), Err(BenchError::MalformedResult { .. })));
}

#[test]
fn test_matches_pattern() {
    assert!(matches_pattern("vllm-10qps.json", "vllm-*qps.json"));
    assert!(matches_pattern("vllm-0.5qps.json", "vllm-*qps.json"));
    assert!(!matches_pattern("vllm-10qps-8000.json", "vllm-*qps.json"));
    assert!(matches_pattern("anything.json", "*.json"));
    assert!(!matches_pattern("notes.txt", "*.json"));
    assert!(matches_pattern("exact.json", "exact.json"));
    assert!(!matches_pattern("exact.json.bak", "exact.json"));
    assert!(matches_pattern("a-b-c.json", "a*b*c.json"));
    assert!(!matches_pattern("a", "a*a"));
    assert!(matches_pattern("", "*"));
}

#[test]
fn test_load_directory_skips_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("vllm-2qps.json"), r#"{"request_rate": 2, "mean_ttft_ms": 50}"#).unwrap();
    fs::write(dir.path().join("vllm-1qps.json"), r#"{"request_rate": 1, "mean_ttft_ms": 40}"#).unwrap();
    fs::write(dir.path().join("vllm-infqps.json"), r#"{"request_rate": "inf"}"#).unwrap();
    fs::write(dir.path().join("vllm-brokenqps.json"), "[").unwrap();
    fs::write(dir.path().join("README.md"), "not a result").unwrap();

    let results = load_directory(dir.path(), "vllm-*qps.json").unwrap();
    let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["vllm-1qps.json", "vllm-2qps.json"]);
}

#[test]
fn test_load_directory_missing_dir_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(matches!(load_directory(&missing, "*.json"), Err(BenchError::Io { .. })));
}
