//! Handler for `inferbench prompt`.

use super::load_target_config;
use crate::commands::PromptArgs;
use crate::error::CliResult;
use crate::output::{probe_lines, ProgressReporter};
use inferbench::llm::{probe_prompt, LlmClient, PromptGenerator};

/// Prompt given on the command line, or a synthetic one.
pub fn prompt_text(args: &PromptArgs, seed: Option<u64>) -> String {
    args.prompt.clone().unwrap_or_else(|| {
        PromptGenerator::from_seed_option(seed).generate(args.length.into())
    })
}

/// Execute `inferbench prompt`.
pub async fn execute_prompt(reporter: &ProgressReporter, args: &PromptArgs) -> CliResult<()> {
    let config = load_target_config(&args.target)?;
    let client = LlmClient::from_config(&config.target, &config.http)?;
    let prompt = prompt_text(args, config.prompt_seed);
    tracing::info!(url = %client.chat_url(), "sending prompt");

    let probe = probe_prompt(&client, &prompt, args.max_tokens).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&probe)?);
        return Ok(());
    }
    reporter.info(&format!("Prompt: {prompt}"));
    println!("{}", probe.response.trim());
    for line in probe_lines(&probe) {
        reporter.info(&line);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::LengthArg;

    #[test]
    fn test_explicit_prompt_wins() {
        let args = PromptArgs {
            prompt: Some("What is 2+2?".to_string()),
            ..PromptArgs::default()
        };
        assert_eq!(prompt_text(&args, None), "What is 2+2?");
    }

    #[test]
    fn test_seeded_synthetic_prompt() {
        let args = PromptArgs {
            length: LengthArg::Short,
            ..PromptArgs::default()
        };
        let a = prompt_text(&args, Some(9));
        let b = prompt_text(&args, Some(9));
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }
}
