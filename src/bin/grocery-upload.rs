//! Command-line upload form: stage up to four images and submit them

use clap::Parser;
use grocery_identifier::{
    observability::init_observability_with_writer,
    upload::{GatewayClient, UploadForm},
};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "grocery-upload", version, about = "Identify grocery items in up to four images")]
struct Cli {
    /// Base URL of a running grocery identifier server
    #[arg(long, env = "GROCERY_SERVER_URL", default_value = "http://localhost:3000")]
    server: String,

    /// Log level for diagnostics on stderr
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Image files (png, jpeg, webp, gif)
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_observability_with_writer(&cli.log_level, "compact", std::io::stderr);

    let mut form = UploadForm::new();
    form.select_files(&cli.images).await;
    if let Some(error) = form.error() {
        anyhow::bail!("{}", error);
    }

    eprintln!("Processing...");
    form.submit(&GatewayClient::new(cli.server)).await;

    if let Some(error) = form.error() {
        anyhow::bail!("{}", error);
    }

    if let Some(result) = form.result() {
        println!("Result:\n{}", result);
    }

    Ok(())
}
