use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, StatusCode};

use super::prompt::{self, SYSTEM_PROMPT};
use super::types::{ChatMessage, ChatRequest, ChatResponse};
use crate::domain::models::{Draft, DraftRequest, GeneratorConfig};
use crate::domain::ports::{CollaboratorError, DraftGenerator};

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Draft generator backed by an OpenAI-compatible chat-completions endpoint
///
/// Timeouts and retries are applied by the optimization loop, not here.
pub struct OpenAiDraftGenerator {
    /// Reusable HTTP client with connection pooling
    http_client: ReqwestClient,

    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiDraftGenerator {
    /// Create a generator from configuration
    ///
    /// # Errors
    /// `NotConfigured` when neither the config nor `OPENAI_API_KEY` provide a key,
    /// `Network` when the HTTP client cannot be built
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, CollaboratorError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|key| !key.trim().is_empty()))
            .ok_or_else(|| {
                CollaboratorError::NotConfigured(format!(
                    "generator api_key is not set and {API_KEY_ENV} is empty"
                ))
            })?;

        let http_client = ReqwestClient::builder()
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| CollaboratorError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn chat_request(&self, request: &DraftRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(prompt::build(request)),
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    async fn send_request(&self, body: &ChatRequest) -> Result<ChatResponse, CollaboratorError> {
        let response = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| CollaboratorError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(from_status(status, body));
        }

        response
            .json()
            .await
            .map_err(|e| {
                CollaboratorError::InvalidResponse(format!("failed to parse completion: {e}"))
            })
    }
}

/// Classify an unsuccessful HTTP status
pub fn from_status(status: StatusCode, body: String) -> CollaboratorError {
    match status.as_u16() {
        429 => CollaboratorError::RateLimited,
        code @ 500..=599 => CollaboratorError::Server {
            status: code,
            message: body,
        },
        code => CollaboratorError::Rejected {
            status: code,
            message: body,
        },
    }
}

#[async_trait]
impl DraftGenerator for OpenAiDraftGenerator {
    async fn generate(&self, request: &DraftRequest) -> Result<Draft, CollaboratorError> {
        let body = self.chat_request(request);
        let response = self.send_request(&body).await?;

        if let Some(usage) = response.usage {
            tracing::debug!(
                keyword = %request.keyword,
                revision = request.hints.is_some(),
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "draft generated"
            );
        }

        response
            .first_text()
            .map(Draft::new)
            .ok_or_else(|| {
                CollaboratorError::InvalidResponse("completion contained no text".to_string())
            })
    }
}
