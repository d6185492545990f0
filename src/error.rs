//! Error taxonomy for the practice backend
//!
//! Two seams, two enums:
//! - [`ApiError`]: everything that can go wrong talking to the
//!   generative-language API, including the terminal retry outcomes
//! - [`SandboxError`]: Docker / IO faults while executing a submission

use thiserror::Error;

/// Failures from the generative-language API and the retry policy
/// wrapped around it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("request to generative API failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx HTTP response, captured with status and body text.
    #[error("generative API returned {status}: {body}")]
    Http { status: u16, body: String },

    /// 2xx response that carried no candidate text.
    #[error("generative API response contained no text")]
    EmptyResponse,

    /// All attempts failed with a transient-overload classification.
    /// Resubmitting later may succeed.
    #[error("generative service is currently overloaded, please try again in a few minutes")]
    Overloaded,

    /// Retry loop ran out of attempts without a classified failure.
    /// Only reachable when a policy is configured with zero attempts.
    #[error("all retry attempts exhausted")]
    RetriesExhausted,
}

impl ApiError {
    /// Transient-overload classification: an HTTP 503, or an overload
    /// marker in the error text.
    pub fn is_transient_overload(&self) -> bool {
        match self {
            ApiError::Http { status, body } => *status == 503 || body.contains("overloaded"),
            ApiError::Overloaded => true,
            other => {
                let msg = other.to_string();
                msg.contains("503") || msg.contains("overloaded")
            }
        }
    }
}

/// Failures while executing a submission in the sandbox.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("docker error: {0}")]
    Docker(#[from] bollard::errors::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid sandbox configuration: {0}")]
    InvalidConfig(String),
}
