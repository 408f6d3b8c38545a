//! The coursewright command-line tool.

use clap::Parser;
use coursewright::cli::{Cli, execute};
use coursewright::{AppConfig, ModelError, ModelErrorKind, OpenAICompatibleClient, StrictOutput};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // stdout carries the JSON result
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?
        .with_overrides(cli.model.clone(), cli.max_tries);
    config.validate()?;
    info!(
        model = %config.model(),
        base_url = %config.base_url(),
        max_tries = config.max_tries(),
        "Configuration loaded"
    );

    let api_key =
        std::env::var("OPENAI_API_KEY").map_err(|_| ModelError::new(ModelErrorKind::MissingApiKey))?;
    let client = OpenAICompatibleClient::new(config.client_config(api_key)?, "openai")?;
    let coercer = StrictOutput::new(client, config.coercer_config());

    let output = execute(&cli.command, &coercer).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
