//! Handler for `inferbench run`.

use super::load_target_config;
use crate::commands::RunArgs;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use inferbench::llm::{self, Benchmark, HttpSessionFactory, LlmClient, ReportFormat};
use inferbench::BenchConfig;

/// Default preset when neither tests nor a preset are given.
pub const DEFAULT_PRESET: &str = "quick";

/// Tests to run: explicit list, else the preset expansion.
pub fn resolve_tests(args: &RunArgs) -> Vec<String> {
    if args.tests.is_empty() {
        llm::selection(args.preset.as_deref().unwrap_or(DEFAULT_PRESET))
    } else {
        args.tests.clone()
    }
}

/// Load the configuration and apply strategy overrides, then validate.
pub fn build_bench_config(args: &RunArgs) -> CliResult<BenchConfig> {
    let mut config = load_target_config(&args.target)?;
    if let Some(n) = args.num_requests {
        config.latency.num_requests = n;
    }
    if let Some(n) = args.clients {
        config.concurrent.num_clients = n;
    }
    if let Some(n) = args.requests_per_client {
        config.concurrent.requests_per_client = n;
    }
    if let Some(secs) = args.duration {
        config.throughput.duration_secs = secs;
    }
    if let Some(n) = args.max_concurrency {
        config.stress.max_concurrency = n;
    }
    if args.seed.is_some() {
        config.prompt_seed = args.seed;
    }
    config.validate()?;
    Ok(config)
}

fn report_format(args: &RunArgs) -> ReportFormat {
    match (args.format, &args.output) {
        (Some(format), _) => format.into(),
        (None, Some(path)) => ReportFormat::from_path(path),
        (None, None) => ReportFormat::Json,
    }
}

/// Execute `inferbench run`.
///
/// Fails after writing the report when any test slot holds an error.
pub async fn execute_run(reporter: &mut ProgressReporter, args: &RunArgs) -> CliResult<()> {
    let tests = resolve_tests(args);
    if tests.is_empty() {
        return Err(CliError::invalid_argument("no tests selected"));
    }
    let config = build_bench_config(args)?;

    reporter.info(&format!(
        "Benchmarking {} (model={}, tests={})",
        config.target.base_url,
        config.target.model,
        tests.join(",")
    ));

    if !args.skip_health_check {
        let client = LlmClient::from_config(&config.target, &config.http)?;
        match client.health_check().await {
            Ok(_) => reporter.success("Health check passed"),
            Err(e) => reporter.warning(&format!("{e}, proceeding anyway")),
        }
    }

    let factory = HttpSessionFactory::new(config.target.clone(), config.http.clone());
    let bench = Benchmark::new(factory, config);
    reporter.start_spinner(&format!("Running {} test(s)", tests.len()));
    let report = bench.run_suite(tests.as_slice()).await;
    reporter.finish();

    for (name, outcome) in &report.tests {
        reporter.outcome(name, outcome);
    }

    let format = report_format(args);
    match &args.output {
        Some(path) => {
            llm::write_report(&report, path, format)?;
            reporter.info(&format!("Report written to {}", path.display()));
        }
        None => println!("{}", llm::render(&report, format)?),
    }
    if let Some(path) = &args.history {
        llm::append_history(path, &report)?;
        reporter.info(&format!("Updated {}", path.display()));
    }

    let failed = report.failed_count();
    if failed > 0 {
        return Err(CliError::TestsFailed {
            failed,
            total: report.tests.len(),
        });
    }
    Ok(())
}
