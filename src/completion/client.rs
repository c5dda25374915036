//! HTTP client for an OpenAI-compatible chat-completions endpoint

use super::{CompletionProvider, models::*};
use crate::config::CompletionConfig;
use crate::error::{CompletionError, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use tracing::debug;

/// Client for the chat-completion API.
///
/// The credential is looked up on every call so a rotated key is picked up
/// without a restart.
pub struct CompletionClient {
    config: CompletionConfig,
    http_client: Client,
}

impl CompletionClient {
    /// Create a new completion client
    pub fn new(config: CompletionConfig) -> Result<Self> {
        let http_client = Client::builder()
            .pool_max_idle_per_host(10)
            .build()
            .map_err(CompletionError::Network)?;

        debug!(api_url = %config.api_url, model = %config.model, "Initialized completion client");

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Create client with custom HTTP client
    pub fn with_http_client(config: CompletionConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Resolve the credential: environment first, configured fallback second
    fn credential(&self) -> std::result::Result<Secret<String>, CompletionError> {
        match std::env::var(&self.config.api_key_env) {
            Ok(value) if !value.trim().is_empty() => Ok(Secret::new(value)),
            _ => self
                .config
                .api_key
                .clone()
                .ok_or_else(|| CompletionError::MissingCredential(self.config.api_key_env.clone())),
        }
    }

    /// Make a single API request
    async fn try_request(&self, request: &ChatCompletionRequest) -> std::result::Result<ChatCompletionResponse, CompletionError> {
        let api_key = self.credential()?;

        debug!(
            model = %request.model,
            parts = request.messages.iter().map(|m| m.content.len()).sum::<usize>(),
            "Making chat-completion API request"
        );

        let response = self.http_client
            .post(&self.config.api_url)
            .bearer_auth(api_key.expose_secret())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let completion: ChatCompletionResponse = serde_json::from_str(&body)?;
            debug!("Received {} completion choices", completion.choices.len());
            return Ok(completion);
        }

        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("{} status code (no body)", status.as_u16()));
        debug!(status = status.as_u16(), "Chat-completion request failed: {}", message);

        Err(CompletionError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Pull `error.message` out of a provider error body
fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error.message)
        .filter(|m| !m.trim().is_empty())
}

#[async_trait]
impl CompletionProvider for CompletionClient {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        Ok(self.try_request(request).await?)
    }

    fn has_credential(&self) -> bool {
        self.credential().is_ok()
    }
}
