//! Suite runner: named tests in order, one report.

use super::executor::{HttpSessionFactory, SessionFactory};
use super::strategy::{Benchmark, TestSummary};
use crate::config::BenchConfig;
use crate::result::{BenchError, BenchResult};
use futures::FutureExt;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// A strategy that can be named in a suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    Latency,
    Concurrent,
    Throughput,
    Stress,
}

impl TestKind {
    pub const ALL: [Self; 4] = [Self::Latency, Self::Concurrent, Self::Throughput, Self::Stress];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Latency => "latency",
            Self::Concurrent => "concurrent",
            Self::Throughput => "throughput",
            Self::Stress => "stress",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestKind {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| BenchError::UnknownTest {
                name: s.to_string(),
            })
    }
}

/// Named test selections.
pub const PRESETS: &[(&str, &[TestKind])] = &[
    ("quick", &[TestKind::Latency]),
    (
        "standard",
        &[TestKind::Latency, TestKind::Concurrent, TestKind::Throughput],
    ),
    ("full", &TestKind::ALL),
    ("stress", &[TestKind::Stress]),
];

/// Tests of a preset, if `name` is one.
pub fn preset(name: &str) -> Option<&'static [TestKind]> {
    PRESETS
        .iter()
        .find(|(preset, _)| *preset == name)
        .map(|(_, tests)| *tests)
}

/// Expand a preset, or treat `name` as a single test.
pub fn selection(name: &str) -> Vec<String> {
    preset(name).map_or_else(
        || vec![name.to_string()],
        |tests| tests.iter().map(|t| t.as_str().to_string()).collect(),
    )
}

/// What a test slot holds: a summary or the reason there is none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TestOutcome {
    Completed(TestSummary),
    Failed { error: String },
}

impl TestOutcome {
    pub fn summary(&self) -> Option<&TestSummary> {
        match self {
            Self::Completed(s) => Some(s),
            Self::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Completed(_) => None,
            Self::Failed { error } => Some(error),
        }
    }
}

impl From<BenchResult<TestSummary>> for TestOutcome {
    fn from(result: BenchResult<TestSummary>) -> Self {
        match result {
            Ok(summary) => Self::Completed(summary),
            Err(e) => Self::Failed {
                error: e.to_string(),
            },
        }
    }
}

/// Everything one suite invocation produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// RFC 3339 start time.
    pub timestamp: String,
    pub model: String,
    pub base_url: String,
    /// Slots in the order the tests were first requested.
    pub tests: IndexMap<String, TestOutcome>,
}

impl BenchmarkReport {
    /// Empty report stamped with the current time.
    pub fn new(model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            model: model.into(),
            base_url: base_url.into(),
            tests: IndexMap::new(),
        }
    }

    /// Number of slots holding an error.
    pub fn failed_count(&self) -> usize {
        self.tests.values().filter(|o| o.error().is_some()).count()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl<F: SessionFactory> Benchmark<F> {
    /// Run one strategy with its configured parameters.
    pub async fn run_test(&self, kind: TestKind) -> BenchResult<TestSummary> {
        let cfg = self.config();
        match kind {
            TestKind::Latency => self
                .latency_test(cfg.latency.num_requests)
                .await
                .map(TestSummary::Latency),
            TestKind::Concurrent => self
                .concurrent_test(cfg.concurrent.num_clients, cfg.concurrent.requests_per_client)
                .await
                .map(TestSummary::Concurrent),
            TestKind::Throughput => self
                .throughput_test(Duration::from_secs(cfg.throughput.duration_secs))
                .await
                .map(TestSummary::Throughput),
            TestKind::Stress => self
                .stress_test(cfg.stress.max_concurrency)
                .await
                .map(TestSummary::Stress),
        }
    }

    /// Run the named tests in order. Never fails: errors, panics and unknown
    /// names end up in their slot.
    pub async fn run_suite<S: AsRef<str>>(&self, tests: &[S]) -> BenchmarkReport {
        let target = &self.config().target;
        let mut report = BenchmarkReport::new(&target.model, &target.base_url);

        for name in tests {
            let name = name.as_ref();
            info!(test = name, "test starting");
            let result = match name.parse::<TestKind>() {
                Ok(kind) => AssertUnwindSafe(self.run_test(kind))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|payload| {
                        Err(BenchError::Panicked {
                            message: panic_message(payload.as_ref()),
                        })
                    }),
                Err(e) => Err(e),
            };
            match &result {
                Ok(summary) => info!(test = name, success_rate = summary.success_rate(), "test finished"),
                Err(e) => warn!(test = name, error = %e, "test failed"),
            }
            report.tests.insert(name.to_string(), result.into());
        }
        report
    }
}

/// Run `tests` against `base_url` with default parameters.
pub async fn run_suite<S: AsRef<str>>(
    base_url: impl Into<String>,
    model: impl Into<String>,
    tests: &[S],
) -> BenchmarkReport {
    let config = BenchConfig::new(base_url, model);
    let factory = HttpSessionFactory::new(config.target.clone(), config.http.clone());
    Benchmark::new(factory, config).run_suite(tests).await
}

/// Run `tests` with a full configuration, after validating it.
pub async fn run_suite_with_config<S: AsRef<str>>(
    config: BenchConfig,
    tests: &[S],
) -> BenchResult<BenchmarkReport> {
    config.validate()?;
    let factory = HttpSessionFactory::new(config.target.clone(), config.http.clone());
    Ok(Benchmark::new(factory, config).run_suite(tests).await)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::llm::client::CHAT_COMPLETIONS_PATH;
    use crate::llm::executor::stub::StubFactory;
    use crate::llm::executor::{RequestMetrics, RequestResult};
    use axum::routing::post;
    use axum::{Json, Router};

    fn quick_config() -> BenchConfig {
        let mut config = BenchConfig::new("http://stub", "stub-model").without_pauses();
        config.throughput.duration_secs = 0;
        config.stress.max_concurrency = 5;
        config
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("stress".parse::<TestKind>().unwrap(), TestKind::Stress);
        let err = "bogus".parse::<TestKind>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown test: bogus");
    }

    #[test]
    fn test_presets() {
        assert_eq!(selection("quick"), vec!["latency"]);
        assert_eq!(selection("standard"), vec!["latency", "concurrent", "throughput"]);
        assert_eq!(selection("full").len(), 4);
        assert_eq!(selection("stress"), vec!["stress"]);
        assert_eq!(selection("concurrent"), vec!["concurrent"]);
        assert!(preset("latency").is_none());
    }

    #[tokio::test]
    async fn test_latency_suite_end_to_end() {
        let bench = Benchmark::new(StubFactory::fixed(0.005, 20), quick_config());
        let report = bench.run_suite(&["latency"]).await;
        assert_eq!(report.model, "stub-model");
        assert_eq!(report.base_url, "http://stub");
        match report.tests["latency"].summary().unwrap() {
            TestSummary::Latency(s) => {
                assert_eq!(s.success_rate, 100.0);
                assert!((s.throughput.mean_tokens_per_second - 4000.0).abs() < 1e-6);
            }
            other => panic!("unexpected summary {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failing_executor_fills_error_slots() {
        let bench = Benchmark::new(StubFactory::failing(), quick_config());
        let report = bench
            .run_suite(&["latency", "concurrent", "throughput", "stress"])
            .await;
        assert_eq!(report.tests.len(), 4);
        for outcome in report.tests.values() {
            assert_eq!(outcome.error(), Some("No successful requests"));
        }
        assert_eq!(report.failed_count(), 4);
    }

    #[tokio::test]
    async fn test_unknown_test_does_not_abort() {
        let bench = Benchmark::new(StubFactory::fixed(0.01, 5), quick_config());
        let report = bench.run_suite(&["bogus", "latency"]).await;
        let keys: Vec<&str> = report.tests.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["bogus", "latency"]);
        assert_eq!(report.tests["bogus"].error(), Some("Unknown test: bogus"));
        assert!(report.tests["latency"].summary().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_name_runs_twice() {
        let factory = StubFactory::fixed(0.01, 5);
        let bench = Benchmark::new(factory.clone(), quick_config());
        let report = bench.run_suite(&["latency", "latency"]).await;
        assert_eq!(report.tests.len(), 1);
        assert_eq!(factory.calls(), 20);
    }

    #[tokio::test]
    async fn test_panic_recorded_in_slot() {
        let factory = StubFactory::new(|n| {
            assert!(n < 1, "executor exploded");
            RequestResult::Success(RequestMetrics::new(0.1, 0.05, 1, 2, 3))
        });
        let bench = Benchmark::new(factory, quick_config());
        let report = bench.run_suite(&["latency", "concurrent"]).await;
        let error = report.tests["latency"].error().unwrap();
        assert!(error.contains("executor exploded"), "{error}");
        assert!(report.tests["concurrent"].error().is_some());
    }

    #[tokio::test]
    async fn test_report_json_shape() {
        let bench = Benchmark::new(StubFactory::fixed(0.01, 5), quick_config());
        let report = bench.run_suite(&["concurrent", "bogus"]).await;
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["model"], "stub-model");
        assert_eq!(json["tests"]["concurrent"]["test_type"], "concurrent");
        assert_eq!(json["tests"]["bogus"]["error"], "Unknown test: bogus");
        assert!(chrono::DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());

        let back: BenchmarkReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }

    #[tokio::test]
    async fn test_run_suite_over_http() {
        let app = Router::new().route(
            CHAT_COMPLETIONS_PATH,
            post(|| async {
                Json(serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": "ok"}}],
                    "usage": {"prompt_tokens": 6, "completion_tokens": 9, "total_tokens": 15}
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let mut config = BenchConfig::new(format!("http://{addr}"), "m").without_pauses();
        config.latency.num_requests = 3;
        config.concurrent.num_clients = 2;
        config.concurrent.requests_per_client = 2;
        let report = run_suite_with_config(config, &["latency", "concurrent"])
            .await
            .unwrap();
        assert_eq!(report.failed_count(), 0);
        match report.tests["concurrent"].summary().unwrap() {
            TestSummary::Concurrent(s) => {
                assert_eq!(s.total_requests, 4);
                assert_eq!(s.throughput_under_load.total_tokens_processed, 60);
            }
            other => panic!("unexpected summary {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_suite_unreachable_server() {
        let report = run_suite("http://127.0.0.1:1", "m", &["bogus"]).await;
        assert_eq!(report.base_url, "http://127.0.0.1:1");
        assert_eq!(report.failed_count(), 1);
    }

    #[tokio::test]
    async fn test_run_suite_with_invalid_config() {
        let mut config = BenchConfig::default();
        config.latency.num_requests = 0;
        assert!(run_suite_with_config(config, &["latency"]).await.is_err());
    }
}
