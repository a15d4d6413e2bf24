//! Inferbench CLI Library
//!
//! Command-line interface for the inferbench benchmarking library.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{
    Cli, ColorArg, Commands, FormatArg, HealthArgs, LengthArg, LogFormatArg, PromptArgs,
    RunArgs, TargetArgs,
};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{probe_lines, summary_lines, ProgressReporter};
