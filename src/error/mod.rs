//! Error types for the grocery identifier

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Fallback message when a failure carries no usable text
pub const GENERIC_SERVER_ERROR: &str = "Internal server error";

/// Main error type for the identification gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Rejected by the explicit input checks; never reaches the upstream API
    #[error("{0}")]
    InvalidInput(#[from] crate::identify::ValidationError),

    /// Body or image entry that could not be decoded
    #[error("{0}")]
    MalformedBody(String),

    /// Body larger than `server.max_body_size_mb`
    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Upstream(#[from] CompletionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised while calling the chat-completion API
#[derive(Error, Debug)]
pub enum CompletionError {
    /// Non-success status; `message` is the upstream's own error text when it sent one
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("{0}")]
    Serialization(#[from] serde_json::Error),

    #[error("The {0} environment variable is missing or empty")]
    MissingCredential(String),
}

/// Errors surfaced by the upload form controller
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("{0}")]
    Validation(String),

    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx answer from the gateway, carrying the extracted message
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("A submission is already in progress.")]
    SubmissionInProgress,
}

/// JSON error body shared by every failing response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl GatewayError {
    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to the caller
    pub fn public_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_SERVER_ERROR.to_string()
        } else {
            message
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}

impl From<BytesRejection> for GatewayError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            GatewayError::PayloadTooLarge(rejection.body_text())
        } else {
            GatewayError::MalformedBody(rejection.body_text())
        }
    }
}

impl From<config::ConfigError> for GatewayError {
    fn from(err: config::ConfigError) -> Self {
        GatewayError::Config(err.to_string())
    }
}
