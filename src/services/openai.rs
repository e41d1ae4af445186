//! OpenAI-compatible chat completions client

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::generation::{GenerationError, GenerationRequest, TextGenerator};
use crate::config::AssistantConfig;

pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    /// Build a client from config, reading the key from the environment.
    ///
    /// # Returns
    /// * `Err(GenerationError::Unauthorized)` if the key variable is unset
    pub fn from_config(config: &AssistantConfig) -> Result<Self, GenerationError> {
        let api_key = config.api_key().ok_or(GenerationError::Unauthorized)?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn body<'a>(&'a self, request: &'a GenerationRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_instructions,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.body(request))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;
        debug!(status = status.as_u16(), bytes = text.len(), "chat completion response");

        if !status.is_success() {
            return Err(classify_status(status, &text));
        }
        extract_text(&text)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

fn transport_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Transport(err.to_string())
    }
}

/// Map a non-success HTTP status to an error.
pub(crate) fn classify_status(status: StatusCode, body: &str) -> GenerationError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited,
        StatusCode::REQUEST_TIMEOUT => GenerationError::Timeout,
        s if s.is_server_error() => GenerationError::Server(s.as_u16()),
        s => GenerationError::InvalidRequest(format!("HTTP {}: {}", s.as_u16(), body.trim())),
    }
}

/// Pull the first choice's text out of a response body.
pub(crate) fn extract_text(body: &str) -> Result<String, GenerationError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(GenerationError::EmptyResponse)
}
