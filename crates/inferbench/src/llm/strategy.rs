//! Load patterns run against an inference endpoint.
//!
//! Four strategies share one [`Benchmark`]:
//! - **latency**: sequential requests, one at a time
//! - **concurrent**: N clients, each with its own session and request series
//! - **throughput**: back-to-back batches until a duration elapses
//! - **stress**: the concurrent strategy at escalating client counts
//!
//! Requests inside a wave are built up front and awaited together with
//! [`join_all`], so every client is in flight before any result is read.

use super::executor::{ChatExecutor, RequestMetrics, RequestResult, SessionFactory};
use super::prompt::{PromptGenerator, PromptLength};
use super::stats::Samples;
use crate::config::{BenchConfig, StressConfig};
use crate::result::{BenchError, BenchResult};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Client counts visited by the stress sweep, before the configured maximum.
pub const STRESS_LEVELS: [usize; 4] = [1, 5, 10, 15];

/// Latency distribution in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
    pub p99: f64,
    pub min: f64,
    pub max: f64,
}

impl LatencyStats {
    fn from_samples(s: &Samples) -> Self {
        Self {
            mean: s.mean(),
            median: s.median(),
            p95: s.percentile(95.0),
            p99: s.percentile(99.0),
            min: s.min(),
            max: s.max(),
        }
    }
}

/// Time-to-first-byte in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirstByteStats {
    pub mean: f64,
    pub median: f64,
}

/// Token throughput of sequential requests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SequentialThroughput {
    pub mean_tokens_per_second: f64,
    pub max_tokens_per_second: f64,
    pub total_tokens: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Token throughput of concurrent requests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadThroughput {
    pub mean_tokens_per_second: f64,
    /// Sum of per-request tokens/s across all successful requests.
    pub aggregate_tokens_per_second: f64,
    pub total_tokens_processed: u64,
}

/// Result of the sequential latency test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub attempted_requests: usize,
    pub successful_requests: usize,
    pub success_rate: f64,
    pub latency: LatencyStats,
    pub time_to_first_byte: FirstByteStats,
    pub throughput: SequentialThroughput,
}

/// Result of the concurrent clients test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcurrentSummary {
    pub num_concurrent_clients: usize,
    pub requests_per_client: usize,
    pub total_requests: usize,
    pub successful_requests: usize,
    pub success_rate: f64,
    /// Wall time from launching the first client to the last one finishing.
    pub total_test_time: f64,
    pub requests_per_second: f64,
    pub latency_under_load: LatencyStats,
    pub throughput_under_load: LoadThroughput,
}

/// Result of the sustained throughput test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputSummary {
    /// Actual elapsed seconds; exceeds the target by up to one batch.
    pub test_duration: f64,
    pub total_requests: usize,
    pub successful_requests: usize,
    pub success_rate: f64,
    pub requests_per_second: f64,
    /// Completion tokens per second of elapsed time.
    pub tokens_per_second: f64,
    pub total_tokens_processed: u64,
    pub average_tokens_per_request: f64,
}

/// One level of the stress sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressPoint {
    pub concurrent_clients: usize,
    pub success_rate: f64,
    pub mean_latency: f64,
    pub p99_latency: f64,
    pub requests_per_second: f64,
}

impl StressPoint {
    /// Point for a level; a failed stage counts as zero success.
    pub fn from_stage(level: usize, stage: &BenchResult<ConcurrentSummary>) -> Self {
        match stage {
            Ok(s) => Self {
                concurrent_clients: level,
                success_rate: s.success_rate,
                mean_latency: s.latency_under_load.mean,
                p99_latency: s.latency_under_load.p99,
                requests_per_second: s.requests_per_second,
            },
            Err(_) => Self {
                concurrent_clients: level,
                success_rate: 0.0,
                mean_latency: 0.0,
                p99_latency: 0.0,
                requests_per_second: 0.0,
            },
        }
    }
}

/// Result of the stress sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressSummary {
    pub max_concurrent_tested: usize,
    /// Levels actually run, ascending.
    pub results_by_load: Vec<StressPoint>,
    /// Level with the highest requests per second; first one wins ties.
    pub optimal_concurrency: usize,
    /// Highest level above the sustainable success rate, or 1.
    pub max_sustainable_concurrency: usize,
}

/// Summary of any strategy, tagged with its test type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "test_type", rename_all = "lowercase")]
pub enum TestSummary {
    Latency(LatencySummary),
    Concurrent(ConcurrentSummary),
    Throughput(ThroughputSummary),
    Stress(StressSummary),
}

impl TestSummary {
    /// Success rate of the run; for the sweep, that of the last level run.
    pub fn success_rate(&self) -> f64 {
        match self {
            Self::Latency(s) => s.success_rate,
            Self::Concurrent(s) => s.success_rate,
            Self::Throughput(s) => s.success_rate,
            Self::Stress(s) => s.results_by_load.last().map_or(0.0, |p| p.success_rate),
        }
    }
}

/// Successful metrics of a wave plus the number attempted.
struct Tally {
    attempted: usize,
    ok: Vec<RequestMetrics>,
}

impl Tally {
    fn new(results: &[RequestResult]) -> BenchResult<Self> {
        let ok: Vec<RequestMetrics> = results.iter().filter_map(RequestResult::metrics).copied().collect();
        if ok.is_empty() {
            return Err(BenchError::NoSuccessfulRequests);
        }
        Ok(Self {
            attempted: results.len(),
            ok,
        })
    }

    fn success_rate(&self) -> f64 {
        self.ok.len() as f64 / self.attempted as f64 * 100.0
    }

    fn samples(&self, field: impl Fn(&RequestMetrics) -> f64) -> BenchResult<Samples> {
        Samples::new(self.ok.iter().map(field).collect()).ok_or(BenchError::NoSuccessfulRequests)
    }

    fn sum(&self, field: impl Fn(&RequestMetrics) -> u32) -> u64 {
        self.ok.iter().map(|m| u64::from(field(m))).sum()
    }
}

fn per_second(amount: f64, seconds: f64) -> f64 {
    if seconds > 0.0 {
        amount / seconds
    } else {
        0.0
    }
}

/// Client counts for a sweep up to `max_concurrency`: ascending, deduplicated,
/// never above the maximum.
pub fn stress_levels(max_concurrency: usize) -> Vec<usize> {
    let mut levels: Vec<usize> = STRESS_LEVELS
        .iter()
        .copied()
        .filter(|&l| l < max_concurrency)
        .collect();
    levels.push(max_concurrency);
    levels
}

/// Run `stage` at each level until one drops below the failure threshold.
///
/// Later levels are never started once the sweep stops; requests already
/// in flight at the failing level are allowed to finish.
pub async fn stress_sweep<S, Fut>(levels: &[usize], config: &StressConfig, mut stage: S) -> StressSummary
where
    S: FnMut(usize) -> Fut,
    Fut: Future<Output = BenchResult<ConcurrentSummary>>,
{
    let mut points = Vec::with_capacity(levels.len());
    for &level in levels {
        info!(concurrent_clients = level, "stress level starting");
        let outcome = stage(level).await;
        if let Err(e) = &outcome {
            debug!(concurrent_clients = level, error = %e, "stress level produced no summary");
        }
        let point = StressPoint::from_stage(level, &outcome);
        info!(
            concurrent_clients = level,
            success_rate = point.success_rate,
            requests_per_second = point.requests_per_second,
            "stress level finished"
        );
        points.push(point);
        if point.success_rate < config.failure_threshold {
            info!(concurrent_clients = level, "success rate below threshold, stopping sweep");
            break;
        }
    }

    let mut optimal: Option<&StressPoint> = None;
    for p in &points {
        if optimal.map_or(true, |best| p.requests_per_second > best.requests_per_second) {
            optimal = Some(p);
        }
    }
    let max_sustainable = points
        .iter()
        .filter(|p| p.success_rate > config.sustainable_threshold)
        .map(|p| p.concurrent_clients)
        .max()
        .unwrap_or(1);

    StressSummary {
        max_concurrent_tested: levels.last().copied().unwrap_or(0),
        optimal_concurrency: optimal.map_or(1, |p| p.concurrent_clients),
        max_sustainable_concurrency: max_sustainable,
        results_by_load: points,
    }
}

/// Benchmark harness bound to one endpoint.
#[derive(Debug)]
pub struct Benchmark<F> {
    factory: F,
    config: BenchConfig,
    prompts: Mutex<PromptGenerator>,
}

impl<F: SessionFactory> Benchmark<F> {
    /// Create a harness; prompts are seeded from `config.prompt_seed`.
    pub fn new(factory: F, config: BenchConfig) -> Self {
        let prompts = PromptGenerator::from_seed_option(config.prompt_seed);
        Self {
            factory,
            config,
            prompts: Mutex::new(prompts),
        }
    }

    pub const fn config(&self) -> &BenchConfig {
        &self.config
    }

    fn prompts(&self, lengths: impl Iterator<Item = PromptLength>) -> Vec<String> {
        let mut gen = self.prompts.lock().unwrap_or_else(PoisonError::into_inner);
        lengths.map(|l| gen.generate(l)).collect()
    }

    fn random_prompts(&self, count: usize) -> Vec<String> {
        let mut gen = self.prompts.lock().unwrap_or_else(PoisonError::into_inner);
        (0..count).map(|_| gen.generate_random()).collect()
    }

    /// Sequential requests cycling short/medium/long prompts.
    pub async fn latency_test(&self, num_requests: usize) -> BenchResult<LatencySummary> {
        let cfg = &self.config.latency;
        info!(num_requests, "latency test starting");
        let session = self.factory.open_session()?;
        let prompts = self.prompts((0..num_requests).map(PromptLength::cycle));
        let pause = Duration::from_millis(cfg.pause_ms);

        let mut results = Vec::with_capacity(num_requests);
        for (i, prompt) in prompts.iter().enumerate() {
            if i > 0 && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
            results.push(session.execute(prompt, cfg.max_tokens).await);
        }

        let tally = Tally::new(&results)?;
        let latencies = tally.samples(|m| m.total_time)?;
        let first_bytes = tally.samples(|m| m.first_byte_time)?;
        let rates = tally.samples(|m| m.tokens_per_second)?;

        Ok(LatencySummary {
            attempted_requests: tally.attempted,
            successful_requests: tally.ok.len(),
            success_rate: tally.success_rate(),
            latency: LatencyStats::from_samples(&latencies),
            time_to_first_byte: FirstByteStats {
                mean: first_bytes.mean(),
                median: first_bytes.median(),
            },
            throughput: SequentialThroughput {
                mean_tokens_per_second: rates.mean(),
                max_tokens_per_second: rates.max(),
                total_tokens: tally.sum(|m| m.total_tokens),
                prompt_tokens: tally.sum(|m| m.prompt_tokens),
                completion_tokens: tally.sum(|m| m.completion_tokens),
            },
        })
    }

    /// `num_clients` clients in parallel, each sending `requests_per_client`
    /// requests one after another over its own session.
    pub async fn concurrent_test(
        &self,
        num_clients: usize,
        requests_per_client: usize,
    ) -> BenchResult<ConcurrentSummary> {
        let max_tokens = self.config.concurrent.max_tokens;
        info!(num_clients, requests_per_client, "concurrent test starting");

        let mut clients = Vec::with_capacity(num_clients);
        for _ in 0..num_clients {
            let session = self.factory.open_session()?;
            let prompts = self.prompts((0..requests_per_client).map(PromptLength::cycle));
            clients.push((session, prompts));
        }

        let start = Instant::now();
        let per_client = join_all(clients.iter().map(|(session, prompts)| async move {
            let mut results = Vec::with_capacity(prompts.len());
            for prompt in prompts {
                results.push(session.execute(prompt, max_tokens).await);
            }
            results
        }))
        .await;
        let total_time = start.elapsed().as_secs_f64();

        let results: Vec<RequestResult> = per_client.into_iter().flatten().collect();
        let tally = Tally::new(&results)?;
        let latencies = tally.samples(|m| m.total_time)?;
        let rates = tally.samples(|m| m.tokens_per_second)?;

        Ok(ConcurrentSummary {
            num_concurrent_clients: num_clients,
            requests_per_client,
            total_requests: tally.attempted,
            successful_requests: tally.ok.len(),
            success_rate: tally.success_rate(),
            total_test_time: total_time,
            requests_per_second: per_second(tally.ok.len() as f64, total_time),
            latency_under_load: LatencyStats::from_samples(&latencies),
            throughput_under_load: LoadThroughput {
                mean_tokens_per_second: rates.mean(),
                aggregate_tokens_per_second: rates.sum(),
                total_tokens_processed: tally.sum(|m| m.total_tokens),
            },
        })
    }

    /// Fixed-size batches of random prompts until `duration` has elapsed.
    ///
    /// The deadline is checked after each batch, so at least one batch runs
    /// even for a zero duration.
    pub async fn throughput_test(&self, duration: Duration) -> BenchResult<ThroughputSummary> {
        let cfg = &self.config.throughput;
        if cfg.batch_size == 0 {
            return Err(BenchError::config("throughput.batch_size must be > 0"));
        }
        info!(duration_secs = duration.as_secs_f64(), batch_size = cfg.batch_size, "throughput test starting");
        let session = self.factory.open_session()?;
        let pause = Duration::from_millis(cfg.pause_ms);

        let start = Instant::now();
        let deadline = start + duration;
        let mut results = Vec::new();
        loop {
            let prompts = self.random_prompts(cfg.batch_size);
            let batch = join_all(prompts.iter().map(|p| session.execute(p, cfg.max_tokens))).await;
            debug!(
                batch_size = batch.len(),
                successful = batch.iter().filter(|r| r.is_success()).count(),
                "throughput batch finished"
            );
            results.extend(batch);
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
            if Instant::now() >= deadline {
                break;
            }
        }
        let elapsed = start.elapsed().as_secs_f64();

        let tally = Tally::new(&results)?;
        let total_tokens = tally.sum(|m| m.total_tokens);
        let completion_tokens = tally.sum(|m| m.completion_tokens);

        Ok(ThroughputSummary {
            test_duration: elapsed,
            total_requests: tally.attempted,
            successful_requests: tally.ok.len(),
            success_rate: tally.success_rate(),
            requests_per_second: per_second(tally.ok.len() as f64, elapsed),
            tokens_per_second: per_second(completion_tokens as f64, elapsed),
            total_tokens_processed: total_tokens,
            average_tokens_per_request: total_tokens as f64 / tally.ok.len() as f64,
        })
    }

    /// Concurrent test at escalating client counts up to `max_concurrency`.
    pub async fn stress_test(&self, max_concurrency: usize) -> BenchResult<StressSummary> {
        let requests_per_client = self.config.stress.requests_per_client;
        let levels = stress_levels(max_concurrency);
        let summary = stress_sweep(&levels, &self.config.stress, |level| {
            self.concurrent_test(level, requests_per_client)
        })
        .await;
        if summary.results_by_load.iter().all(|p| p.success_rate == 0.0) {
            return Err(BenchError::NoSuccessfulRequests);
        }
        Ok(summary)
    }
}
