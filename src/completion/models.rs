//! Data models for chat-completion requests and responses

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identify::DataUrl;

/// Author of a prompt message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// Reference to an image by URL (here always a data URL)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageUrl {
    pub url: String,
}

/// One part of a mixed text/image message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    /// Text instruction part
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Image part; only a well-formed data URL can become one
    pub fn image(data_url: &DataUrl) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: data_url.to_string(),
            },
        }
    }
}

/// A prompt message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

/// Request body for the chat-completions endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub store: bool,
}

/// Response from the chat-completions endpoint.
///
/// Choices are kept as raw JSON so they can be relayed untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatCompletionResponse {
    /// First completion choice, if any
    pub fn first_choice(&self) -> Option<&Value> {
        self.choices.first()
    }

    /// Consume the response and keep only the first choice
    pub fn into_first_choice(self) -> Option<Value> {
        self.choices.into_iter().next()
    }
}

/// Error envelope the provider returns on failure
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}
