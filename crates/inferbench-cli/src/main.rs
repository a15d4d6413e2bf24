//! Inferbench CLI: benchmark OpenAI-compatible inference endpoints
//!
//! ## Usage
//!
//! ```bash
//! inferbench run --url http://localhost:8000 --model llama-3       # quick preset
//! inferbench run --preset full --output results/run.json          # all four tests
//! inferbench run --tests latency,stress --max-concurrency 32
//! inferbench prompt "Explain entropy in one paragraph."
//! inferbench health --url http://gpu-box:8000
//! ```

use clap::Parser;
use inferbench_cli::{handlers, Cli, CliConfig, CliError, CliResult, Commands, ProgressReporter, Verbosity};
use std::future::Future;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    config.init_logging()?;
    let mut reporter = ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());

    match cli.command {
        Commands::Run(args) => block_on(handlers::execute_run(&mut reporter, &args)),
        Commands::Prompt(args) => block_on(handlers::execute_prompt(&reporter, &args)),
        Commands::Health(args) => block_on(handlers::execute_health(&reporter, &args)),
        Commands::Presets => {
            print_presets();
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet))
        .with_color(cli.color.into())
        .with_log_format(cli.log_format.into())
}

fn block_on<F: Future<Output = CliResult<()>>>(future: F) -> CliResult<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create async runtime: {e}")))?;
    rt.block_on(future)
}

fn print_presets() {
    for (name, tests) in inferbench::llm::PRESETS {
        let tests: Vec<&str> = tests.iter().map(|t| t.as_str()).collect();
        println!("{name:<10} {}", tests.join(", "));
    }
}
