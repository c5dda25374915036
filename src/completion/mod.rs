//! Client for the multimodal chat-completion API

pub mod client;
pub mod models;

pub use client::CompletionClient;
pub use models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentPart, ImageUrl, Role};

use async_trait::async_trait;
use crate::error::Result;

/// Trait for chat-completion providers
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send one prompt and return the provider's response, one attempt only
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse>;

    /// Whether a credential is currently available
    fn has_credential(&self) -> bool;
}
