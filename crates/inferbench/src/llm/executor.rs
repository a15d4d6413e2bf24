//! Single-request execution.
//!
//! [`ChatExecutor`] is the seam between the strategies and the network: a
//! strategy only ever sees [`RequestResult`]s, never errors. Each concurrent
//! logical client gets its own session from a [`SessionFactory`].

use super::client::{LlmClient, TimedChatResponse};
use crate::config::{HttpConfig, TargetConfig};
use crate::result::{BenchError, BenchResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Timing and token counters of one successful request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequestMetrics {
    /// Seconds from dispatch until the whole body was read.
    pub total_time: f64,
    /// Seconds from dispatch until the response head arrived.
    pub first_byte_time: f64,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    /// `completion_tokens / total_time`, zero when `total_time <= 0`.
    pub tokens_per_second: f64,
}

impl RequestMetrics {
    /// Build metrics and derive tokens per second.
    pub fn new(
        total_time: f64,
        first_byte_time: f64,
        prompt_tokens: u32,
        completion_tokens: u32,
        total_tokens: u32,
    ) -> Self {
        let tokens_per_second = if total_time > 0.0 {
            f64::from(completion_tokens) / total_time
        } else {
            0.0
        };
        Self {
            total_time,
            first_byte_time,
            prompt_tokens,
            completion_tokens,
            total_tokens,
            tokens_per_second,
        }
    }
}

/// Outcome of one chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum RequestResult {
    /// The server answered with a usable completion.
    Success(RequestMetrics),
    /// Transport or protocol failure.
    Failure {
        /// Human-readable cause.
        error: String,
    },
}

impl RequestResult {
    /// Failure with the given description.
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Metrics of a successful request.
    pub const fn metrics(&self) -> Option<&RequestMetrics> {
        match self {
            Self::Success(m) => Some(m),
            Self::Failure { .. } => None,
        }
    }

    /// Error of a failed request.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure { error } => Some(error),
        }
    }

    /// Convert a client outcome, rejecting completions without usage or choices.
    pub fn from_response(outcome: BenchResult<TimedChatResponse>) -> Self {
        let timed = match outcome {
            Ok(timed) => timed,
            Err(e) => return Self::failure(e.to_string()),
        };
        if timed.response.choices.is_empty() {
            return Self::failure(BenchError::malformed("response has no choices").to_string());
        }
        let Some(usage) = timed.response.usage else {
            return Self::failure(BenchError::malformed("response has no usage").to_string());
        };
        Self::Success(RequestMetrics::new(
            timed.latency.as_secs_f64(),
            timed.ttfb.as_secs_f64(),
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens,
        ))
    }
}

/// Issues one chat completion and reports how it went.
///
/// Implementations must not panic or return early on failure: every problem
/// becomes [`RequestResult::Failure`].
#[async_trait]
pub trait ChatExecutor: Send + Sync {
    /// Send `prompt` with a `max_tokens` budget.
    async fn execute(&self, prompt: &str, max_tokens: u32) -> RequestResult;
}

/// Opens independent sessions, one per logical client.
pub trait SessionFactory: Send + Sync {
    /// Session type handed to each client.
    type Session: ChatExecutor;

    /// Open a fresh session with its own connection pool.
    fn open_session(&self) -> BenchResult<Self::Session>;
}

#[async_trait]
impl ChatExecutor for LlmClient {
    async fn execute(&self, prompt: &str, max_tokens: u32) -> RequestResult {
        let result = RequestResult::from_response(self.chat(prompt, max_tokens).await);
        match &result {
            RequestResult::Success(m) => tracing::debug!(
                latency_s = m.total_time,
                completion_tokens = m.completion_tokens,
                "request succeeded"
            ),
            RequestResult::Failure { error } => tracing::debug!(%error, "request failed"),
        }
        result
    }
}

/// Opens [`LlmClient`] sessions against one endpoint.
#[derive(Debug, Clone)]
pub struct HttpSessionFactory {
    target: TargetConfig,
    http: HttpConfig,
}

impl HttpSessionFactory {
    pub const fn new(target: TargetConfig, http: HttpConfig) -> Self {
        Self { target, http }
    }
}

impl SessionFactory for HttpSessionFactory {
    type Session = LlmClient;

    fn open_session(&self) -> BenchResult<LlmClient> {
        LlmClient::from_config(&self.target, &self.http)
    }
}

#[cfg(test)]
pub(crate) mod stub {
    //! In-memory executors for strategy tests.

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Decides the outcome of the n-th request across all sessions.
    pub type Behaviour = Arc<dyn Fn(usize) -> RequestResult + Send + Sync>;

    #[derive(Clone)]
    pub struct StubFactory {
        behaviour: Behaviour,
        calls: Arc<AtomicUsize>,
        sessions: Arc<AtomicUsize>,
        in_flight: Arc<AtomicUsize>,
        peak_in_flight: Arc<AtomicUsize>,
    }

    impl StubFactory {
        pub fn new(behaviour: impl Fn(usize) -> RequestResult + Send + Sync + 'static) -> Self {
            Self {
                behaviour: Arc::new(behaviour),
                calls: Arc::new(AtomicUsize::new(0)),
                sessions: Arc::new(AtomicUsize::new(0)),
                in_flight: Arc::new(AtomicUsize::new(0)),
                peak_in_flight: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Every request takes `latency` seconds and yields `completion` tokens.
        pub fn fixed(latency: f64, completion: u32) -> Self {
            Self::new(move |_| {
                RequestResult::Success(RequestMetrics::new(
                    latency,
                    latency / 2.0,
                    10,
                    completion,
                    10 + completion,
                ))
            })
        }

        pub fn failing() -> Self {
            Self::new(|_| RequestResult::failure("connection refused"))
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn sessions(&self) -> usize {
            self.sessions.load(Ordering::SeqCst)
        }

        /// Most requests that were ever awaiting a response at once.
        pub fn peak_in_flight(&self) -> usize {
            self.peak_in_flight.load(Ordering::SeqCst)
        }
    }

    pub struct StubSession(StubFactory);

    #[async_trait]
    impl ChatExecutor for StubSession {
        async fn execute(&self, _prompt: &str, _max_tokens: u32) -> RequestResult {
            let n = self.0.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.0.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.0.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
            (self.0.behaviour)(n)
        }
    }

    impl SessionFactory for StubFactory {
        type Session = StubSession;

        fn open_session(&self) -> BenchResult<StubSession> {
            self.sessions.fetch_add(1, Ordering::SeqCst);
            Ok(StubSession(self.clone()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::llm::client::{ChatResponse, CHAT_COMPLETIONS_PATH};
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::time::Duration;

    fn timed(json: &str, latency_ms: u64) -> TimedChatResponse {
        TimedChatResponse {
            response: serde_json::from_str::<ChatResponse>(json).unwrap(),
            latency: Duration::from_millis(latency_ms),
            ttfb: Duration::from_millis(latency_ms / 2),
        }
    }

    #[test]
    fn test_tokens_per_second() {
        let m = RequestMetrics::new(0.5, 0.1, 10, 50, 60);
        assert!((m.tokens_per_second - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_tokens_per_second_zero_time() {
        assert_eq!(RequestMetrics::new(0.0, 0.0, 1, 20, 21).tokens_per_second, 0.0);
        assert_eq!(RequestMetrics::new(-1.0, 0.0, 1, 20, 21).tokens_per_second, 0.0);
    }

    #[test]
    fn test_from_response_success() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"ok"}}],
                       "usage":{"prompt_tokens":5,"completion_tokens":20,"total_tokens":25}}"#;
        let result = RequestResult::from_response(Ok(timed(json, 200)));
        let m = result.metrics().unwrap();
        assert_eq!(m.total_tokens, 25);
        assert!((m.total_time - 0.2).abs() < 1e-9);
        assert!((m.first_byte_time - 0.1).abs() < 1e-9);
        assert!((m.tokens_per_second - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_response_missing_usage() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"ok"}}]}"#;
        let result = RequestResult::from_response(Ok(timed(json, 10)));
        assert!(result.error().unwrap().contains("no usage"));
    }

    #[test]
    fn test_from_response_no_choices() {
        let json = r#"{"choices":[],"usage":{"prompt_tokens":1,"completion_tokens":0,"total_tokens":1}}"#;
        let result = RequestResult::from_response(Ok(timed(json, 10)));
        assert!(!result.is_success());
    }

    #[test]
    fn test_from_response_error() {
        let err = BenchError::ApiError {
            status: 500,
            body: "boom".to_string(),
        };
        let result = RequestResult::from_response(Err(err));
        assert_eq!(result.error(), Some("API error 500: boom"));
    }

    #[test]
    fn test_result_serialization() {
        let json = serde_json::to_value(RequestResult::failure("timeout")).unwrap();
        assert_eq!(json["outcome"], "failure");
        assert_eq!(json["error"], "timeout");
    }

    #[tokio::test]
    async fn test_http_executor_roundtrip() {
        let app = Router::new().route(
            CHAT_COMPLETIONS_PATH,
            post(|| async {
                Json(serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": "hi"}}],
                    "usage": {"prompt_tokens": 4, "completion_tokens": 8, "total_tokens": 12}
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let factory = HttpSessionFactory::new(
            TargetConfig {
                base_url: format!("http://{addr}"),
                model: "m".to_string(),
            },
            HttpConfig::default(),
        );
        let session = factory.open_session().unwrap();
        let result = session.execute("hello", 32).await;
        assert_eq!(result.metrics().unwrap().completion_tokens, 8);
    }

    #[tokio::test]
    async fn test_http_executor_non_success_status() {
        let app = Router::new().route(
            CHAT_COMPLETIONS_PATH,
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let client = LlmClient::new(format!("http://{addr}"), "m").unwrap();
        let result = client.execute("hello", 32).await;
        assert_eq!(result.error(), Some("API error 429: slow down"));
    }

    #[tokio::test]
    async fn test_http_executor_connection_refused() {
        let client = LlmClient::new("http://127.0.0.1:1", "m").unwrap();
        let result = client.execute("hello", 32).await;
        assert!(result.error().unwrap().contains("HTTP error"));
    }
}
