//! Failures at the hosted model boundary

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no API key: set {0}")]
    MissingCredential(String),

    #[error("upstream returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl LlmError {
    /// Timeouts, rate limiting and server errors may succeed on a second try
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Timeout(_) => true,
            LlmError::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Short description for end users; never includes the upstream body
    pub fn summary(&self) -> String {
        match self {
            LlmError::MissingCredential(_) => "no API key is configured".to_string(),
            LlmError::Upstream { status, .. } => format!("the model service returned HTTP {status}"),
            LlmError::Timeout(_) => "the model service timed out".to_string(),
            LlmError::Transport(_) => "the model service could not be reached".to_string(),
            LlmError::MalformedResponse(_) => "the model service sent an unreadable reply".to_string(),
        }
    }
}
