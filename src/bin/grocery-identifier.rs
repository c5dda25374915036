//! Grocery Identifier Server Binary
//!
//! Serves the upload page and the identify endpoint.

use anyhow::Context;
use grocery_identifier::{build_app, config::Config, observability::init_observability, shutdown::shutdown_signal};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Load configuration from file when one is given
    let config_path = std::env::var("CONFIG_PATH").ok().map(PathBuf::from);
    let config = Config::from_env(config_path.as_deref())
        .context("failed to load configuration")?;

    init_observability(&config.logging.level, &config.logging.format);

    info!("Starting Grocery Identifier Server");
    match &config_path {
        Some(path) => info!("Configuration loaded and validated from {}", path.display()),
        None => info!("Configuration loaded from defaults and environment"),
    }
    info!(
        model = %config.completion.model,
        api_url = %config.completion.api_url,
        credential_env = %config.completion.api_key_env,
        "Completion API configured"
    );

    let app = build_app(&config)?;

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
