//! Inferbench: load testing for LLM inference endpoints.
//!
//! Drives an OpenAI-compatible `/v1/chat/completions` server with synthetic
//! prompts and reports latency, throughput and capacity:
//!
//! ```text
//! PromptGenerator ──► Benchmark strategy ──► ChatExecutor ──► endpoint
//!                           │
//!                           ▼
//!                   TestSummary ──► BenchmarkReport ──► JSON / Markdown
//! ```
//!
//! ```no_run
//! # async fn demo() {
//! let report = inferbench::run_suite("http://localhost:8000", "llama-3", &["latency"]).await;
//! println!("{}", inferbench::llm::to_markdown(&report));
//! # }
//! ```

// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod config;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::doc_markdown,
    clippy::cast_precision_loss
)]
pub mod llm;
mod result;

pub use config::BenchConfig;
pub use llm::{run_suite, run_suite_with_config, Benchmark, BenchmarkReport, TestKind};
pub use result::{BenchError, BenchResult};
