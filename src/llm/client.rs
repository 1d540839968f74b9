//! OpenAI-compatible chat-completions client over `reqwest`
use super::{LanguageModel, ModelInvocationError};
use crate::config::LlmConfig;
use crate::error::{NutriError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Client for `POST {base_url}/chat/completions`
pub struct ChatCompletionClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl ChatCompletionClient {
    /// Create a client with an explicit credential
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> std::result::Result<Self, ModelInvocationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelInvocationError::Request(format!("failed to build client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.7,
            timeout,
        })
    }

    /// Create a client from configuration, reading the credential once
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config.api_key().map_err(|_| {
            NutriError::ModelInvocation(ModelInvocationError::MissingCredential(
                config.api_key_env.clone(),
            ))
        })?;
        let timeout = config.timeout()?;
        let client = Self::new(&config.base_url, api_key, config.model.clone(), timeout)
            .map_err(NutriError::ModelInvocation)?;
        Ok(client.with_temperature(config.temperature))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

// ── Chat completions request/response types ────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Pull the answer text out of a chat-completions body
fn parse_completion(body: &str) -> std::result::Result<String, ModelInvocationError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ModelInvocationError::MalformedResponse(format!("invalid JSON: {e}")))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ModelInvocationError::MalformedResponse("no message content".to_string()))
}

/// Turn a non-success status and body into an error
fn classify_failure(status: u16, body: &str) -> ModelInvocationError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        401 | 403 => ModelInvocationError::Auth { status, message },
        _ => ModelInvocationError::Api { status, message },
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionClient {
    async fn complete(&self, prompt: &str) -> std::result::Result<String, ModelInvocationError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "requesting completion");

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelInvocationError::Timeout(self.timeout)
                } else {
                    ModelInvocationError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ModelInvocationError::Timeout(self.timeout)
            } else {
                ModelInvocationError::Request(format!("failed to read body: {e}"))
            }
        })?;

        if !status.is_success() {
            debug!(model = %self.model, %status, "model API returned failure status");
            return Err(classify_failure(status.as_u16(), &body));
        }

        parse_completion(&body)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
