//! OpenAI-compatible HTTP client for chat completion endpoints.
//!
//! Works against vLLM, realizar, ollama, llama.cpp and anything else that
//! serves `/v1/chat/completions`.

use crate::config::{HttpConfig, TargetConfig};
use crate::result::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Path appended to the base URL for chat completions.
pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Chat message role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompt
    System,
    /// User message
    User,
    /// Assistant response
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message author.
    pub role: Role,
    /// The content of the message.
    pub content: String,
}

impl ChatMessage {
    /// A user-authored message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Body of a chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation so far.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Benchmarks always request the whole body at once.
    pub stream: bool,
}

impl ChatRequest {
    /// Single-turn, non-streaming request.
    pub fn single_turn(
        model: impl Into<String>,
        prompt: impl Into<String>,
        temperature: f64,
        max_tokens: u32,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
            temperature,
            max_tokens,
            stream: false,
        }
    }
}

/// Token usage counters.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Usage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens generated.
    pub completion_tokens: u32,
    /// Total tokens (prompt + completion).
    pub total_tokens: u32,
}

/// A single completion choice.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatResponseChoice {
    /// Index of this choice.
    #[serde(default)]
    pub index: u32,
    /// The generated message.
    pub message: ChatMessage,
    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Response from a chat completion endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatResponse {
    /// Unique identifier for this completion.
    #[serde(default)]
    pub id: String,
    /// Model that served the request.
    #[serde(default)]
    pub model: String,
    /// Generated choices.
    pub choices: Vec<ChatResponseChoice>,
    /// Token usage counters.
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Text of the first choice, if any.
    pub fn content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

/// A chat response with timing metadata.
#[derive(Debug, Clone)]
pub struct TimedChatResponse {
    /// The API response.
    pub response: ChatResponse,
    /// Time until the whole body was read.
    pub latency: Duration,
    /// Time until the response head arrived.
    pub ttfb: Duration,
}

/// One HTTP session against an inference endpoint.
///
/// Cloning shares the underlying connection pool; build a new client with
/// [`LlmClient::from_config`] to get an independent session.
#[derive(Debug, Clone)]
pub struct LlmClient {
    base_url: String,
    client: reqwest::Client,
    model: String,
    temperature: f64,
}

impl LlmClient {
    /// Create a client with the default timeout and temperature.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the API server (e.g., `http://localhost:8000`)
    /// * `model` - Model name to include in requests
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> BenchResult<Self> {
        let target = TargetConfig {
            base_url: base_url.into(),
            model: model.into(),
        };
        Self::from_config(&target, &HttpConfig::default())
    }

    /// Create a client with its own connection pool.
    pub fn from_config(target: &TargetConfig, http: &HttpConfig) -> BenchResult<Self> {
        let client = reqwest::Client::builder().timeout(http.timeout()).build()?;
        Ok(Self::with_client(
            &target.base_url,
            &target.model,
            http.temperature,
            client,
        ))
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(
        base_url: impl Into<String>,
        model: impl Into<String>,
        temperature: f64,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            model: model.into(),
            temperature,
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full chat completions URL.
    pub fn chat_url(&self) -> String {
        format!("{}{CHAT_COMPLETIONS_PATH}", self.base_url)
    }

    /// Send one single-turn prompt and return the response with timing.
    ///
    /// Fails on transport errors, any status other than 200, and bodies that are
    /// not a chat completion.
    pub async fn chat(&self, prompt: &str, max_tokens: u32) -> BenchResult<TimedChatResponse> {
        let request = ChatRequest::single_turn(&self.model, prompt, self.temperature, max_tokens);
        self.send(&request).await
    }

    /// Send a prepared request and return the response with timing.
    pub async fn send(&self, request: &ChatRequest) -> BenchResult<TimedChatResponse> {
        let start = Instant::now();

        let resp = self.client.post(self.chat_url()).json(request).send().await?;
        let ttfb = start.elapsed();

        let status = resp.status();
        let body = resp.bytes().await?;
        let latency = start.elapsed();

        if status != reqwest::StatusCode::OK {
            return Err(BenchError::ApiError {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let response: ChatResponse = serde_json::from_slice(&body)
            .map_err(|e| BenchError::malformed(format!("invalid chat completion body: {e}")))?;

        Ok(TimedChatResponse {
            response,
            latency,
            ttfb,
        })
    }

    /// Check if the server is reachable by hitting common health endpoints.
    pub async fn health_check(&self) -> BenchResult<bool> {
        for path in &["/health", "/v1/models", "/"] {
            let url = format!("{}{path}", self.base_url);
            if let Ok(resp) = self.client.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(true);
                }
            }
        }
        Err(BenchError::HealthCheckFailed(format!(
            "No health endpoint responded at {}",
            self.base_url
        )))
    }
}
