//! Grocery Identifier - upload up to four photos, get back what a multimodal model sees
//!
//! Two layers:
//!
//! - **Identification gateway** ([`identify`], [`api`]): `POST /api/identify`
//!   validates a batch of one to four base64 images, turns each into a data URL,
//!   sends one prompt to a chat-completion API and relays its first choice.
//! - **Upload form** ([`upload`]): reads local files, encodes them and submits
//!   them to the gateway, tracking loading/error/result state explicitly.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use grocery_identifier::prelude::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut form = UploadForm::new();
//!     form.select_files(&["milk.jpg", "eggs.png"]).await;
//!     form.submit(&GatewayClient::new("http://localhost:3000")).await;
//!
//!     match (form.result(), form.error()) {
//!         (Some(result), _) => println!("{}", result),
//!         (_, Some(error)) => eprintln!("{}", error),
//!         _ => {}
//!     }
//! }
//! ```

pub mod api;
pub mod completion;
pub mod config;
pub mod error;
pub mod identify;
pub mod observability;
pub mod shutdown;
pub mod upload;

pub use config::Config;
pub use error::{GatewayError, Result};

use std::sync::Arc;

/// Wire the gateway, provider and probes into a ready-to-serve router
pub fn build_app(config: &Config) -> Result<axum::Router> {
    let provider: Arc<dyn completion::CompletionProvider> =
        Arc::new(completion::CompletionClient::new(config.completion.clone())?);
    Ok(build_app_with_provider(config, provider))
}

/// Same as [`build_app`] with a caller-supplied completion provider
pub fn build_app_with_provider(
    config: &Config,
    provider: Arc<dyn completion::CompletionProvider>,
) -> axum::Router {
    let metrics = Arc::new(observability::MetricsCollector::new());
    let health_checker = Arc::new(observability::HealthChecker::new().with_provider(provider.clone()));
    let gateway = Arc::new(identify::IdentificationGateway::new(
        &config.completion,
        provider,
        metrics.clone(),
    ));

    let state = api::AppState {
        gateway,
        metrics,
        health_checker,
    };

    api::build_router(state, config.server.max_body_size_bytes())
}

/// Re-export commonly used types
pub mod prelude {
    pub use crate::completion::{CompletionClient, CompletionProvider};
    pub use crate::config::Config;
    pub use crate::error::{GatewayError, Result, UploadError};
    pub use crate::identify::{DataUrl, IdentificationGateway, IdentificationRequest, ImagePayload};
    pub use crate::upload::{GatewayClient, Phase, UploadForm};
}
