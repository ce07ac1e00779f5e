use srsbench_common::config::validate_percentiles;
use srsbench_common::{BenchError, DatasetConfig, ReportConfig};
use std::path::PathBuf;

#[test]
fn test_config_defaults_applied() {
    let json = r#"{"results_root":"../result_backup","datasets":[{"name":"lmcache"}]}"#;
    let config = ReportConfig::from_json(json).unwrap();
    assert_eq!(config.results_root, PathBuf::from("../result_backup"));
    assert_eq!(config.datasets, vec![DatasetConfig { name: "lmcache".to_string(), grouped: false }]);
    assert_eq!(config.percentiles, vec![99.0, 99.99]);
    assert_eq!(config.output_dir, PathBuf::from("."));
}

#[test]
fn test_config_full() {
    let json = r#"{
        "results_root": "results",
        "datasets": [
            {"name": "lmcache"},
            {"name": "dp_lmcache_g4", "grouped": true},
            {"name": "dp_lmcache_g5", "grouped": true}
        ],
        "percentiles": [50, 99],
        "output_dir": "out"
    }"#;
    let config = ReportConfig::from_json(json).unwrap();
    assert_eq!(config.datasets.len(), 3);
    assert!(!config.datasets[0].grouped);
    assert!(config.datasets[1].grouped);
    assert_eq!(config.percentiles, vec![50.0, 99.0]);
    assert_eq!(config.output_dir, PathBuf::from("out"));
}

#[test]
fn test_config_rejects_empty_and_duplicate_datasets() {
    let empty = r#"{"results_root":"r","datasets":[]}"#;
    assert!(matches!(ReportConfig::from_json(empty), Err(BenchError::Config(_))));

    let dup = r#"{"results_root":"r","datasets":[{"name":"a"},{"name":"a","grouped":true}]}"#;
    assert!(matches!(ReportConfig::from_json(dup), Err(BenchError::Config(m)) if m.contains("twice")));
}

#[test]
fn test_config_rejects_out_of_range_percentile() {
    let json = r#"{"results_root":"r","datasets":[{"name":"a"}],"percentiles":[99, 101]}"#;
    assert!(matches!(ReportConfig::from_json(json), Err(BenchError::InvalidArgument(_))));
}

#[test]
fn test_config_rejects_malformed_json() {
    assert!(matches!(ReportConfig::from_json("{"), Err(BenchError::Config(_))));
    assert!(matches!(ReportConfig::from_json(r#"{"datasets":[]}"#), Err(BenchError::Config(_))));
}

#[test]
fn test_validate_percentiles() {
    assert!(validate_percentiles(&[0.0, 50.0, 100.0]).is_ok());
    assert!(validate_percentiles(&[]).is_err());
    assert!(validate_percentiles(&[-0.5]).is_err());
    assert!(validate_percentiles(&[f64::NAN]).is_err());
}

#[test]
fn test_dataset_parse() {
    assert_eq!(
        DatasetConfig::parse("lmcache").unwrap(),
        DatasetConfig { name: "lmcache".to_string(), grouped: false }
    );
    assert_eq!(
        DatasetConfig::parse("dp_lmcache_g4:grouped").unwrap(),
        DatasetConfig { name: "dp_lmcache_g4".to_string(), grouped: true }
    );
    assert_eq!(
        DatasetConfig::parse("lmcache:standard").unwrap(),
        DatasetConfig { name: "lmcache".to_string(), grouped: false }
    );
    assert!(DatasetConfig::parse("").is_err());
    assert!(DatasetConfig::parse(":grouped").is_err());
    assert!(DatasetConfig::parse("a:merged").is_err());
}
