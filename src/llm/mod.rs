//! Generative model access
//!
//! [`LanguageModel`] is the seam between the responders and whatever produces
//! text. [`ChatCompletionClient`] talks to any OpenAI-compatible
//! chat-completions endpoint (Groq by default).

mod client;

pub use client::ChatCompletionClient;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Failure to get text out of a model service
#[derive(Error, Debug)]
pub enum ModelInvocationError {
    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Authentication rejected ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Model API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Query embedding failed: {0}")]
    Embedding(String),
}

impl ModelInvocationError {
    /// Short, stable label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential(_) => "missing_credential",
            Self::Request(_) => "request",
            Self::Auth { .. } => "auth",
            Self::Api { .. } => "api",
            Self::Timeout(_) => "timeout",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Embedding(_) => "embedding",
        }
    }
}

/// A text-completion model: prompt in, generated text out
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for `prompt`
    async fn complete(&self, prompt: &str) -> Result<String, ModelInvocationError>;

    /// Identifier of the model variant in use
    fn model_id(&self) -> &str;
}
