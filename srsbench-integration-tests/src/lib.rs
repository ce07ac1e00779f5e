//! Fixtures shared by the end-to-end tests: vLLM-style result files written to disk.

use serde_json::{json, Map, Value};
use std::path::Path;

/// One benchmark run as a result file would record it. Latencies are in seconds.
#[derive(Debug, Clone, Default)]
pub struct RunFixture {
    pub request_rate: f64,
    pub request_throughput: f64,
    pub mean_ttft_ms: Option<f64>,
    pub mean_tpot_ms: Option<f64>,
    pub ttfts: Vec<f64>,
    pub itls: Vec<Vec<f64>>,
    pub output_lens: Vec<u64>,
}

impl RunFixture {
    pub fn new(request_rate: f64, request_throughput: f64) -> Self {
        Self { request_rate, request_throughput, ..Default::default() }
    }

    pub fn means(mut self, ttft_ms: f64, tpot_ms: f64) -> Self {
        self.mean_ttft_ms = Some(ttft_ms);
        self.mean_tpot_ms = Some(tpot_ms);
        self
    }

    pub fn ttfts(mut self, seconds: &[f64]) -> Self {
        self.ttfts = seconds.to_vec();
        self
    }

    pub fn itls(mut self, per_request: Vec<Vec<f64>>) -> Self {
        self.output_lens = per_request.iter().map(|r| r.len() as u64 + 1).collect();
        self.itls = per_request;
        self
    }

    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("backend".to_string(), json!("vllm"));
        object.insert("request_rate".to_string(), json!(self.request_rate));
        object.insert("request_throughput".to_string(), json!(self.request_throughput));
        object.insert("completed".to_string(), json!(self.ttfts.len()));
        if let Some(v) = self.mean_ttft_ms {
            object.insert("mean_ttft_ms".to_string(), json!(v));
        }
        if let Some(v) = self.mean_tpot_ms {
            object.insert("mean_tpot_ms".to_string(), json!(v));
        }
        if !self.ttfts.is_empty() {
            object.insert("ttfts".to_string(), json!(self.ttfts));
        }
        if !self.itls.is_empty() {
            object.insert("itls".to_string(), json!(self.itls));
            object.insert("output_lens".to_string(), json!(self.output_lens));
        }
        Value::Object(object)
    }

    /// Write this run as `dir/name`, creating `dir` if needed.
    pub fn write(&self, dir: &Path, name: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(name), self.to_json().to_string())
    }
}
