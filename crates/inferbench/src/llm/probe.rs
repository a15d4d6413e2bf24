//! One-off prompt check with headline metrics.

use super::client::LlmClient;
use crate::result::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};

/// Result of sending a single prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptProbe {
    /// Text of the first choice.
    pub response: String,
    pub latency_ms: f64,
    /// Completion tokens per second.
    pub throughput_tps: f64,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub time_seconds: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Send `prompt` once and report latency, throughput and token counts,
/// rounded to two decimals.
///
/// Missing usage counts as zero tokens; a response without choices is an
/// error.
pub async fn probe_prompt(client: &LlmClient, prompt: &str, max_tokens: u32) -> BenchResult<PromptProbe> {
    let timed = client.chat(prompt, max_tokens).await?;
    let response = timed
        .response
        .content()
        .ok_or_else(|| BenchError::malformed("response has no choices"))?
        .to_string();
    let usage = timed.response.usage.unwrap_or_default();
    let seconds = timed.latency.as_secs_f64();
    let throughput = if seconds > 0.0 {
        f64::from(usage.completion_tokens) / seconds
    } else {
        0.0
    };
    tracing::debug!(latency_s = seconds, completion_tokens = usage.completion_tokens, "probe finished");

    Ok(PromptProbe {
        response,
        latency_ms: round2(seconds * 1000.0),
        throughput_tps: round2(throughput),
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
        total_tokens: usage.total_tokens,
        time_seconds: round2(seconds),
    })
}
