//! The text-generation seam between the gateway and a remote model.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Shape the model is asked to reply in.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseFormat {
    /// Free text.
    Text,
    /// JSON constrained by a response schema.
    Json { schema: serde_json::Value },
}

/// One prompt sent to a [`TextGenerator`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: Option<u32>,
    pub response_format: ResponseFormat,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: 0.7,
            max_output_tokens: None,
            response_format: ResponseFormat::Text,
        }
    }

    pub fn json(prompt: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            response_format: ResponseFormat::Json { schema },
            ..Self::text(prompt)
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }
}

/// Failures of a single generation call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgentError {
    /// The credentials were rejected. Never retried.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The remote call failed at the transport or HTTP level.
    #[error("Process error (status {status_code:?}): {message}")]
    ProcessError {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
        retry_after: Option<Duration>,
    },

    /// The model answered with no text at all.
    #[error("Model returned an empty response")]
    EmptyResponse,

    /// The reply could not be parsed into the requested shape.
    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    /// The prompt template failed to render.
    #[error("Prompt rendering failed: {0}")]
    Prompt(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

impl AgentError {
    pub fn process_error_with_retry_after(
        status_code: u16,
        message: impl Into<String>,
        is_retryable: bool,
        retry_after: Duration,
    ) -> Self {
        Self::ProcessError {
            status_code: Some(status_code),
            message: message.into(),
            is_retryable,
            retry_after: Some(retry_after),
        }
    }

    /// Whether trying the same request again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ProcessError { is_retryable, .. } => *is_retryable,
            Self::EmptyResponse => true,
            Self::Authentication(_)
            | Self::MalformedOutput(_)
            | Self::Prompt(_)
            | Self::ExecutionFailed(_) => false,
        }
    }

    /// Server-requested minimum wait before the next attempt.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::ProcessError { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// A remote (or scripted) text generator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short human-readable name used in logs and status messages.
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<String, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(!AgentError::Authentication("bad key".into()).is_retryable());
        assert!(!AgentError::MalformedOutput("not json".into()).is_retryable());
        assert!(AgentError::EmptyResponse.is_retryable());

        let throttled =
            AgentError::process_error_with_retry_after(429, "slow down", true, Duration::from_secs(2));
        assert!(throttled.is_retryable());
        assert_eq!(throttled.retry_after(), Some(Duration::from_secs(2)));

        let bad_request = AgentError::ProcessError {
            status_code: Some(400),
            message: "bad".into(),
            is_retryable: false,
            retry_after: None,
        };
        assert!(!bad_request.is_retryable());
    }

    #[test]
    fn test_json_request_keeps_defaults() {
        let request = GenerationRequest::json("p", serde_json::json!({"type": "ARRAY"}))
            .with_max_output_tokens(64);
        assert_eq!(request.temperature, 0.7);
        assert_eq!(request.max_output_tokens, Some(64));
        assert!(matches!(request.response_format, ResponseFormat::Json { .. }));
    }
}
