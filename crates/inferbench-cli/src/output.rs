//! Terminal output: status lines, a spinner, and text summaries of results

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use inferbench::llm::{PromptProbe, TestOutcome, TestSummary};
use std::time::Duration;

/// Status reporter writing to stderr
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    spinner: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            spinner: None,
            use_color,
            quiet,
        }
    }

    /// Show a spinner until [`Self::finish`] is called
    pub fn start_spinner(&mut self, message: &str) {
        if self.quiet || !self.term.is_term() {
            return;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        self.spinner = Some(pb);
    }

    /// Stop and clear the spinner
    pub fn finish(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    fn line(&self, symbol: &str, plain: &str, color: fn(&str) -> String, message: &str) {
        let prefix = if self.use_color {
            color(symbol)
        } else {
            plain.to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.line("✓", "PASS", |s| style(s).green().bold().to_string(), message);
        }
    }

    /// Print a failure message, even in quiet mode
    pub fn failure(&self, message: &str) {
        self.line("✗", "FAIL", |s| style(s).red().bold().to_string(), message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            self.line("⚠", "WARN", |s| style(s).yellow().bold().to_string(), message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.line("ℹ", "INFO", |s| style(s).blue().bold().to_string(), message);
        }
    }

    /// Print a test slot: a headline then its metric lines
    pub fn outcome(&self, name: &str, outcome: &TestOutcome) {
        match outcome {
            TestOutcome::Completed(summary) => {
                self.success(&format!("{name} ({:.1}% success)", summary.success_rate()));
                if !self.quiet {
                    for line in summary_lines(summary) {
                        let _ = self.term.write_line(&format!("    {line}"));
                    }
                }
            }
            TestOutcome::Failed { error } => self.failure(&format!("{name}: {error}")),
        }
    }
}

fn ms(seconds: f64) -> String {
    format!("{:.1} ms", seconds * 1000.0)
}

/// Human-readable metric lines for a summary
pub fn summary_lines(summary: &TestSummary) -> Vec<String> {
    match summary {
        TestSummary::Latency(s) => vec![
            format!(
                "Requests:     {}/{} ok",
                s.successful_requests, s.attempted_requests
            ),
            format!(
                "Latency:      mean {}  median {}  p95 {}  p99 {}",
                ms(s.latency.mean),
                ms(s.latency.median),
                ms(s.latency.p95),
                ms(s.latency.p99)
            ),
            format!("TTFB:         mean {}", ms(s.time_to_first_byte.mean)),
            format!(
                "Tokens/sec:   mean {:.1}  max {:.1}",
                s.throughput.mean_tokens_per_second, s.throughput.max_tokens_per_second
            ),
        ],
        TestSummary::Concurrent(s) => vec![
            format!(
                "Clients:      {} x {} requests",
                s.num_concurrent_clients, s.requests_per_client
            ),
            format!("Requests:     {}/{} ok", s.successful_requests, s.total_requests),
            format!("Throughput:   {:.2} req/s", s.requests_per_second),
            format!(
                "Latency:      mean {}  p95 {}  p99 {}",
                ms(s.latency_under_load.mean),
                ms(s.latency_under_load.p95),
                ms(s.latency_under_load.p99)
            ),
            format!(
                "Tokens/sec:   {:.1} aggregate",
                s.throughput_under_load.aggregate_tokens_per_second
            ),
        ],
        TestSummary::Throughput(s) => vec![
            format!("Duration:     {:.1} s", s.test_duration),
            format!("Requests:     {}/{} ok", s.successful_requests, s.total_requests),
            format!("Throughput:   {:.2} req/s", s.requests_per_second),
            format!("Tokens/sec:   {:.1}", s.tokens_per_second),
        ],
        TestSummary::Stress(s) => {
            let mut lines: Vec<String> = s
                .results_by_load
                .iter()
                .map(|p| {
                    format!(
                        "{:>4} clients: {:5.1}% ok  {:.2} req/s  p99 {}",
                        p.concurrent_clients,
                        p.success_rate,
                        p.requests_per_second,
                        ms(p.p99_latency)
                    )
                })
                .collect();
            lines.push(format!(
                "Optimal concurrency: {}  Max sustainable: {}",
                s.optimal_concurrency, s.max_sustainable_concurrency
            ));
            lines
        }
    }
}

/// Human-readable lines for a prompt probe
pub fn probe_lines(probe: &PromptProbe) -> Vec<String> {
    vec![
        format!("Latency:      {:.2} ms", probe.latency_ms),
        format!("Tokens/sec:   {:.2}", probe.throughput_tps),
        format!(
            "Tokens:       {} prompt + {} completion = {}",
            probe.prompt_tokens, probe.completion_tokens, probe.total_tokens
        ),
    ]
}
