//! Benchmark configuration.
//!
//! Every strategy parameter has a default, so an empty YAML document is a
//! valid configuration. Load with [`BenchConfig::from_yaml_file`] and let the
//! CLI override individual values afterwards.

use crate::result::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Endpoint under test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL of the inference server, without the `/v1/...` suffix.
    pub base_url: String,
    /// Model name sent in every request.
    pub model: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            model: "default".to_string(),
        }
    }
}

/// HTTP client settings shared by every session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Sampling temperature sent with each request.
    pub temperature: f64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            temperature: 0.7,
        }
    }
}

impl HttpConfig {
    /// Timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Sequential latency test parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub num_requests: usize,
    pub max_tokens: u32,
    /// Pause between consecutive requests, in milliseconds.
    pub pause_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            num_requests: 10,
            max_tokens: 256,
            pause_ms: 100,
        }
    }
}

/// Concurrent clients test parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrentConfig {
    pub num_clients: usize,
    pub requests_per_client: usize,
    pub max_tokens: u32,
}

impl Default for ConcurrentConfig {
    fn default() -> Self {
        Self {
            num_clients: 5,
            requests_per_client: 3,
            max_tokens: 256,
        }
    }
}

/// Sustained throughput test parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThroughputConfig {
    /// Target duration; the in-flight batch always finishes.
    pub duration_secs: u64,
    pub batch_size: usize,
    pub max_tokens: u32,
    /// Pause after each batch, in milliseconds.
    pub pause_ms: u64,
}

impl Default for ThroughputConfig {
    fn default() -> Self {
        Self {
            duration_secs: 30,
            batch_size: 10,
            max_tokens: 128,
            pause_ms: 500,
        }
    }
}

/// Stress sweep parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    pub max_concurrency: usize,
    pub requests_per_client: usize,
    /// The sweep stops after a level whose success rate is below this.
    pub failure_threshold: f64,
    /// A level counts as sustainable when its success rate is above this.
    pub sustainable_threshold: f64,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 20,
            requests_per_client: 2,
            failure_threshold: 50.0,
            sustainable_threshold: 90.0,
        }
    }
}

/// Complete benchmark configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub target: TargetConfig,
    pub http: HttpConfig,
    pub latency: LatencyConfig,
    pub concurrent: ConcurrentConfig,
    pub throughput: ThroughputConfig,
    pub stress: StressConfig,
    /// Seed for the prompt generator; random when unset.
    pub prompt_seed: Option<u64>,
}

impl BenchConfig {
    /// Create the default configuration for a target.
    #[must_use]
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            target: TargetConfig {
                base_url: base_url.into(),
                model: model.into(),
            },
            ..Self::default()
        }
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> BenchResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file.
    pub fn from_yaml_file(path: &Path) -> BenchResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> BenchResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Remove sleeps between requests and batches (stub servers, tests).
    #[must_use]
    pub const fn without_pauses(mut self) -> Self {
        self.latency.pause_ms = 0;
        self.throughput.pause_ms = 0;
        self
    }

    /// Reject values that would make a strategy meaningless.
    pub fn validate(&self) -> BenchResult<()> {
        if self.target.base_url.trim().is_empty() {
            return Err(BenchError::config("target.base_url must not be empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(BenchError::config("http.timeout_secs must be > 0"));
        }
        let counts = [
            ("latency.num_requests", self.latency.num_requests),
            ("concurrent.num_clients", self.concurrent.num_clients),
            (
                "concurrent.requests_per_client",
                self.concurrent.requests_per_client,
            ),
            ("throughput.batch_size", self.throughput.batch_size),
            ("stress.max_concurrency", self.stress.max_concurrency),
            ("stress.requests_per_client", self.stress.requests_per_client),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(BenchError::config(format!("{name} must be > 0")));
            }
        }
        if !(0.0..=100.0).contains(&self.stress.failure_threshold)
            || !(0.0..=100.0).contains(&self.stress.sustainable_threshold)
        {
            return Err(BenchError::config(
                "stress thresholds must be percentages in 0..=100",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BenchConfig::default();
        assert_eq!(config.latency.num_requests, 10);
        assert_eq!(config.concurrent.num_clients, 5);
        assert_eq!(config.concurrent.requests_per_client, 3);
        assert_eq!(config.throughput.duration_secs, 30);
        assert_eq!(config.throughput.batch_size, 10);
        assert_eq!(config.throughput.max_tokens, 128);
        assert_eq!(config.stress.max_concurrency, 20);
        assert_eq!(config.stress.requests_per_client, 2);
        assert_eq!(config.http.temperature, 0.7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = BenchConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, BenchConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r"
target:
  base_url: http://gpu-box:5002
  model: HuggingFaceTB/SmolLM3-3B
latency:
  num_requests: 3
stress:
  max_concurrency: 15
prompt_seed: 42
";
        let config = BenchConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.target.base_url, "http://gpu-box:5002");
        assert_eq!(config.target.model, "HuggingFaceTB/SmolLM3-3B");
        assert_eq!(config.latency.num_requests, 3);
        assert_eq!(config.latency.pause_ms, 100);
        assert_eq!(config.stress.max_concurrency, 15);
        assert_eq!(config.prompt_seed, Some(42));
    }

    #[test]
    fn test_validate_rejects_zero_counts() {
        let mut config = BenchConfig::default();
        config.concurrent.num_clients = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("concurrent.num_clients"));
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let config = BenchConfig::new("  ", "m");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_threshold() {
        let mut config = BenchConfig::default();
        config.stress.failure_threshold = 150.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(BenchConfig::from_yaml_str("latency: [1, 2").is_err());
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.yaml");
        let config = BenchConfig::new("http://x", "m");
        std::fs::write(&path, config.to_yaml().unwrap()).unwrap();
        let loaded = BenchConfig::from_yaml_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_without_pauses() {
        let config = BenchConfig::default().without_pauses();
        assert_eq!(config.latency.pause_ms, 0);
        assert_eq!(config.throughput.pause_ms, 0);
    }
}
