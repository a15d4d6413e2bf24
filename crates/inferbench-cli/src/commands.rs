//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use inferbench::llm::{PromptLength, ReportFormat};
use std::path::PathBuf;

/// Inferbench: latency, throughput and capacity benchmarks for LLM inference endpoints
#[derive(Parser, Debug)]
#[command(name = "inferbench")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a benchmark suite
    Run(RunArgs),

    /// Send one prompt and show its latency and throughput
    Prompt(PromptArgs),

    /// Check that the endpoint answers
    Health(HealthArgs),

    /// List suite presets
    Presets,
}

/// Endpoint selection shared by all network commands
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Base URL of the OpenAI-compatible server
    #[arg(long, env = "INFERBENCH_URL")]
    pub url: Option<String>,

    /// Model name sent with every request
    #[arg(short, long, env = "INFERBENCH_MODEL")]
    pub model: Option<String>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Tests to run, in order (latency, concurrent, throughput, stress)
    #[arg(short, long, value_delimiter = ',', conflicts_with = "preset")]
    pub tests: Vec<String>,

    /// Preset (quick, standard, full, stress) or a single test name
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Write the report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format; defaults to the output file's extension
    #[arg(short, long)]
    pub format: Option<FormatArg>,

    /// Append a summary row to this Markdown history file
    #[arg(long)]
    pub history: Option<PathBuf>,

    /// Requests in the latency test
    #[arg(long)]
    pub num_requests: Option<usize>,

    /// Clients in the concurrent test
    #[arg(long)]
    pub clients: Option<usize>,

    /// Requests per client in the concurrent test
    #[arg(long)]
    pub requests_per_client: Option<usize>,

    /// Throughput test duration in seconds
    #[arg(long)]
    pub duration: Option<u64>,

    /// Highest client count of the stress test
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Seed for reproducible prompts
    #[arg(long)]
    pub seed: Option<u64>,

    /// Skip the health check before the suite
    #[arg(long)]
    pub skip_health_check: bool,
}

/// Arguments for the prompt command
#[derive(Args, Debug, Clone, Default)]
pub struct PromptArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Prompt text; a synthetic prompt is generated when omitted
    pub prompt: Option<String>,

    /// Length of the synthetic prompt
    #[arg(short, long, default_value = "medium")]
    pub length: LengthArg,

    /// Maximum tokens to generate
    #[arg(long, default_value = "256")]
    pub max_tokens: u32,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the health command
#[derive(Args, Debug, Clone, Default)]
pub struct HealthArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Color argument for CLI
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum ColorArg {
    /// Auto-detect
    #[default]
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum LogFormatArg {
    /// Human-readable
    #[default]
    Text,
    /// JSON lines
    Json,
}

impl From<LogFormatArg> for crate::config::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Report format argument
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum FormatArg {
    /// Pretty-printed JSON
    Json,
    /// Markdown tables
    Markdown,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => Self::Json,
            FormatArg::Markdown => Self::Markdown,
        }
    }
}

/// Prompt length argument
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum LengthArg {
    /// One-line question
    Short,
    /// Paragraph-sized request
    #[default]
    Medium,
    /// Multi-part analytical request
    Long,
}

impl From<LengthArg> for PromptLength {
    fn from(arg: LengthArg) -> Self {
        match arg {
            LengthArg::Short => Self::Short,
            LengthArg::Medium => Self::Medium,
            LengthArg::Long => Self::Long,
        }
    }
}
