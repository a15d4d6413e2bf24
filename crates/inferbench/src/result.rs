//! Result and error types for inferbench.

use thiserror::Error;

/// Result type for inferbench operations
pub type BenchResult<T> = Result<T, BenchError>;

/// Errors that can occur while configuring or running a benchmark
#[derive(Debug, Error)]
pub enum BenchError {
    /// Invalid configuration value
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// A strategy finished without a single successful request
    #[error("No successful requests")]
    NoSuccessfulRequests,

    /// Test name outside of latency/concurrent/throughput/stress
    #[error("Unknown test: {name}")]
    UnknownTest {
        /// The name that was requested
        name: String,
    },

    /// A strategy panicked while running
    #[error("Test panicked: {message}")]
    Panicked {
        /// Panic payload, if it was a string
        message: String,
    },

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("API error {status}: {body}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Response body did not have the expected shape
    #[error("Malformed response: {message}")]
    MalformedResponse {
        /// Error message
        message: String,
    },

    /// No health endpoint answered
    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BenchError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a malformed response error
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }
}
