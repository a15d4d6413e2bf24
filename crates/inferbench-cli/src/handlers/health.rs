//! Handler for `inferbench health`.

use super::load_target_config;
use crate::commands::HealthArgs;
use crate::error::CliResult;
use crate::output::ProgressReporter;
use inferbench::llm::LlmClient;

/// Execute `inferbench health`.
pub async fn execute_health(reporter: &ProgressReporter, args: &HealthArgs) -> CliResult<()> {
    let config = load_target_config(&args.target)?;
    let client = LlmClient::from_config(&config.target, &config.http)?;
    client.health_check().await?;
    reporter.success(&format!("{} is healthy", client.base_url()));
    Ok(())
}
