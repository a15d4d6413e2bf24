//! Benchmarking for OpenAI-compatible chat completion endpoints.
//!
//! - **Prompts**: randomized short/medium/long prompts
//! - **Client**: HTTP client and the per-request executor seam
//! - **Strategies**: latency, concurrent, throughput and stress tests
//! - **Suite**: ordered test runs collected into one report
//! - **Reporting**: JSON and Markdown rendering with historical tracking

pub mod client;
pub mod executor;
pub mod probe;
pub mod prompt;
pub mod report;
pub mod stats;
pub mod strategy;
pub mod suite;

pub use client::{
    ChatMessage, ChatRequest, ChatResponse, ChatResponseChoice, LlmClient, Role,
    TimedChatResponse, Usage,
};
pub use executor::{
    ChatExecutor, HttpSessionFactory, RequestMetrics, RequestResult, SessionFactory,
};
pub use probe::{probe_prompt, PromptProbe};
pub use prompt::{PromptGenerator, PromptLength};
pub use report::{append_history, render, to_json, to_markdown, write_report, ReportFormat};
pub use stats::Samples;
pub use strategy::{
    stress_levels, stress_sweep, Benchmark, ConcurrentSummary, LatencySummary, StressPoint,
    StressSummary, TestSummary, ThroughputSummary,
};
pub use suite::{
    preset, run_suite, run_suite_with_config, selection, BenchmarkReport, TestKind, TestOutcome,
    PRESETS,
};
