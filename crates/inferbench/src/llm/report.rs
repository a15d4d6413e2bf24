//! Report rendering for benchmark suites.
//!
//! Produces JSON and Markdown output, and can append a one-line summary of
//! each run to a historical `performance.md` table.

use super::strategy::{
    ConcurrentSummary, LatencySummary, StressSummary, TestSummary, ThroughputSummary,
};
use super::suite::{BenchmarkReport, TestOutcome};
use crate::result::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

/// Output format of a written report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Markdown,
}

impl ReportFormat {
    /// Guess from a path's extension, falling back to JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("md" | "markdown") => Self::Markdown,
            _ => Self::Json,
        }
    }
}

/// Serialize a report to pretty-printed JSON.
pub fn to_json(report: &BenchmarkReport) -> BenchResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn table(out: &mut String, rows: &[(&str, String)]) {
    out.push_str("| Metric | Value |\n|--------|-------|\n");
    for (name, value) in rows {
        let _ = writeln!(out, "| {name} | {value} |");
    }
}

fn secs(value: f64) -> String {
    format!("{:.1} ms", value * 1000.0)
}

fn latency_section(out: &mut String, s: &LatencySummary) {
    table(
        out,
        &[
            (
                "Successful requests",
                format!("{}/{}", s.successful_requests, s.attempted_requests),
            ),
            ("Success rate", format!("{:.1}%", s.success_rate)),
            ("Latency mean", secs(s.latency.mean)),
            ("Latency median", secs(s.latency.median)),
            ("Latency p95", secs(s.latency.p95)),
            ("Latency p99", secs(s.latency.p99)),
            ("Latency min / max", format!("{} / {}", secs(s.latency.min), secs(s.latency.max))),
            ("TTFB mean", secs(s.time_to_first_byte.mean)),
            ("TTFB median", secs(s.time_to_first_byte.median)),
            ("Tokens/s mean", format!("{:.1}", s.throughput.mean_tokens_per_second)),
            ("Tokens/s max", format!("{:.1}", s.throughput.max_tokens_per_second)),
            ("Total tokens", s.throughput.total_tokens.to_string()),
        ],
    );
}

fn concurrent_section(out: &mut String, s: &ConcurrentSummary) {
    table(
        out,
        &[
            ("Clients", s.num_concurrent_clients.to_string()),
            ("Requests per client", s.requests_per_client.to_string()),
            (
                "Successful requests",
                format!("{}/{}", s.successful_requests, s.total_requests),
            ),
            ("Success rate", format!("{:.1}%", s.success_rate)),
            ("Wall time", format!("{:.2} s", s.total_test_time)),
            ("Requests/s", format!("{:.2}", s.requests_per_second)),
            ("Latency mean", secs(s.latency_under_load.mean)),
            ("Latency p95", secs(s.latency_under_load.p95)),
            ("Latency p99", secs(s.latency_under_load.p99)),
            (
                "Aggregate tokens/s",
                format!("{:.1}", s.throughput_under_load.aggregate_tokens_per_second),
            ),
            (
                "Total tokens",
                s.throughput_under_load.total_tokens_processed.to_string(),
            ),
        ],
    );
}

fn throughput_section(out: &mut String, s: &ThroughputSummary) {
    table(
        out,
        &[
            ("Duration", format!("{:.2} s", s.test_duration)),
            (
                "Successful requests",
                format!("{}/{}", s.successful_requests, s.total_requests),
            ),
            ("Success rate", format!("{:.1}%", s.success_rate)),
            ("Requests/s", format!("{:.2}", s.requests_per_second)),
            ("Completion tokens/s", format!("{:.1}", s.tokens_per_second)),
            ("Total tokens", s.total_tokens_processed.to_string()),
            (
                "Tokens per request",
                format!("{:.1}", s.average_tokens_per_request),
            ),
        ],
    );
}

fn stress_section(out: &mut String, s: &StressSummary) {
    let _ = writeln!(
        out,
        "Optimal concurrency: **{}**, max sustainable concurrency: **{}** (tested up to {}).\n",
        s.optimal_concurrency, s.max_sustainable_concurrency, s.max_concurrent_tested
    );
    out.push_str("| Clients | Success rate | Mean latency | P99 latency | Requests/s |\n");
    out.push_str("|---------|--------------|--------------|-------------|------------|\n");
    for p in &s.results_by_load {
        let _ = writeln!(
            out,
            "| {} | {:.1}% | {} | {} | {:.2} |",
            p.concurrent_clients,
            p.success_rate,
            secs(p.mean_latency),
            secs(p.p99_latency),
            p.requests_per_second
        );
    }
}

/// Render a report as Markdown: a header, then one section per test slot.
pub fn to_markdown(report: &BenchmarkReport) -> String {
    let mut out = String::from("# Benchmark Report\n\n");
    let _ = writeln!(out, "- **Model:** {}", report.model);
    let _ = writeln!(out, "- **Endpoint:** {}", report.base_url);
    let _ = writeln!(out, "- **Timestamp:** {}", report.timestamp);

    for (name, outcome) in &report.tests {
        let _ = write!(out, "\n## {name}\n\n");
        match outcome {
            TestOutcome::Failed { error } => {
                let _ = writeln!(out, "**Error:** {error}");
            }
            TestOutcome::Completed(TestSummary::Latency(s)) => latency_section(&mut out, s),
            TestOutcome::Completed(TestSummary::Concurrent(s)) => concurrent_section(&mut out, s),
            TestOutcome::Completed(TestSummary::Throughput(s)) => throughput_section(&mut out, s),
            TestOutcome::Completed(TestSummary::Stress(s)) => stress_section(&mut out, s),
        }
    }
    out
}

/// Render `report` in `format`.
pub fn render(report: &BenchmarkReport, format: ReportFormat) -> BenchResult<String> {
    match format {
        ReportFormat::Json => to_json(report),
        ReportFormat::Markdown => Ok(to_markdown(report)),
    }
}

/// Write `report` to `path`, creating parent directories.
pub fn write_report(report: &BenchmarkReport, path: &Path, format: ReportFormat) -> BenchResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, render(report, format)?)?;
    Ok(())
}

/// Header for the history Markdown table.
const HISTORY_HEADER: &str = "\
| Date | Model | Latency mean (ms) | Latency p95 (ms) | Concurrent RPS | Throughput tok/s | Optimal concurrency | Failed tests |
|------|-------|-------------------|------------------|----------------|------------------|---------------------|--------------|";

fn cell(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

/// One history row summarizing a report; missing tests show as `-`.
pub fn to_history_row(report: &BenchmarkReport) -> String {
    let mut latency = None;
    let mut concurrent = None;
    let mut throughput = None;
    let mut stress = None;
    for summary in report.tests.values().filter_map(TestOutcome::summary) {
        match summary {
            TestSummary::Latency(s) => latency = Some(s),
            TestSummary::Concurrent(s) => concurrent = Some(s),
            TestSummary::Throughput(s) => throughput = Some(s),
            TestSummary::Stress(s) => stress = Some(s),
        }
    }
    format!(
        "| {} | {} | {} | {} | {} | {} | {} | {} |",
        report.timestamp.split('T').next().unwrap_or(&report.timestamp),
        report.model,
        cell(latency.map(|s| format!("{:.1}", s.latency.mean * 1000.0))),
        cell(latency.map(|s| format!("{:.1}", s.latency.p95 * 1000.0))),
        cell(concurrent.map(|s| format!("{:.2}", s.requests_per_second))),
        cell(throughput.map(|s| format!("{:.1}", s.tokens_per_second))),
        cell(stress.map(|s| s.optimal_concurrency.to_string())),
        report.failed_count(),
    )
}

/// Append a run to a history file, creating it with a header if needed.
///
/// An existing file without the table gets a new table section appended.
pub fn append_history(path: &Path, report: &BenchmarkReport) -> BenchResult<()> {
    let existing = if path.exists() {
        std::fs::read_to_string(path)?
    } else {
        String::new()
    };
    let row = to_history_row(report);

    let content = if existing.is_empty() {
        format!("# LLM Inference Performance\n\n{HISTORY_HEADER}\n{row}\n")
    } else if existing.contains(HISTORY_HEADER.lines().next().unwrap_or_default()) {
        format!("{}\n{row}\n", existing.trim_end())
    } else {
        let mut out = existing;
        if !out.ends_with('\n') {
            out.push('\n');
        }
        let _ = write!(out, "\n## Performance History\n\n{HISTORY_HEADER}\n{row}\n");
        out
    };

    std::fs::write(path, content)?;
    Ok(())
}
