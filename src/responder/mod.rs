//! Question answering on top of the model and the index
//!
//! Responders keep failures as [`ResponderError`] internally and only turn
//! them into fixed, human-readable text at their boundary methods, logging
//! exactly one error line per failed call.

mod direct;
mod format;
mod prompt;
mod retrieval;

pub use direct::DirectResponder;
pub use format::emphasize_list_markers;
pub use prompt::{nutrition_prompt, retrieval_prompt};
pub use retrieval::{GroundedAnswer, RetrievalResponder};

use crate::embedding::VectorIndexError;
use crate::index::IndexBuildError;
use crate::llm::{LanguageModel, ModelInvocationError};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Returned by `ask` when the index could not be built
pub const INDEX_UNAVAILABLE: &str = "Unable to build Index";
/// Returned by `ask` when anything after the index build fails
pub const ANSWER_UNAVAILABLE: &str = "Unable to answer the question at the moment";
/// Returned by `analyze` on any failure
pub const NUTRITION_UNAVAILABLE: &str = "Unable to fetch Nutrition Info";

/// Which responder operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Ask,
    Analyze,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Ask => "ask",
            Operation::Analyze => "analyze",
        }
    }
}

#[derive(Error, Debug)]
pub enum ResponderError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Index build failed: {0}")]
    IndexBuild(#[from] IndexBuildError),

    #[error("Model invocation failed: {0}")]
    Model(#[from] ModelInvocationError),

    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] VectorIndexError),
}

impl ResponderError {
    /// Short, stable label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::IndexBuild(_) => "index_build",
            Self::Model(e) => e.kind(),
            Self::Retrieval(_) => "retrieval",
        }
    }

    /// Text handed to the caller in place of an answer
    pub fn fallback(&self, operation: Operation) -> &'static str {
        match (operation, self) {
            (Operation::Analyze, _) => NUTRITION_UNAVAILABLE,
            (Operation::Ask, Self::IndexBuild(_)) => INDEX_UNAVAILABLE,
            (Operation::Ask, _) => ANSWER_UNAVAILABLE,
        }
    }
}

/// Collapse a responder result to text, logging one line either way
fn settle(operation: Operation, input: &str, result: Result<String, ResponderError>) -> String {
    match result {
        Ok(answer) => answer,
        Err(e) => {
            tracing::error!(
                operation = operation.as_str(),
                input,
                kind = e.kind(),
                error = %e,
                "Responder failed, returning fallback"
            );
            e.fallback(operation).to_string()
        }
    }
}

/// Reject empty or whitespace-only input
fn require_text<'a>(value: &'a str, what: &str) -> Result<&'a str, ResponderError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ResponderError::InvalidInput(format!("{what} cannot be empty")));
    }
    Ok(trimmed)
}

/// Run a model call under `limit`; expiry counts as a model failure
async fn complete_within(
    model: &dyn LanguageModel,
    prompt: &str,
    limit: Duration,
) -> Result<String, ModelInvocationError> {
    bounded(model.complete(prompt), limit).await
}

async fn bounded<F>(call: F, limit: Duration) -> Result<String, ModelInvocationError>
where
    F: Future<Output = Result<String, ModelInvocationError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ModelInvocationError::Timeout(limit)),
    }
}
