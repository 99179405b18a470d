//! Pharmaq application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Build the language-model client and the SMTP exporter
//! 3. Start the axum HTTP server that also serves the page

mod cli;

use std::sync::Arc;

use clap::Parser;

use pharmaq_api::routes;
use pharmaq_api::state::AppState;
use pharmaq_chat::{CompletionClient, MockCompletionClient, OpenAiClient};
use pharmaq_core::config::PharmaqConfig;
use pharmaq_report::EmailExporter;

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing starts so its log level can apply;
    // a load failure is reported once the subscriber is up.
    let config_file = args.resolve_config_path();
    let loaded = if config_file.exists() {
        Some(PharmaqConfig::load(&config_file))
    } else {
        None
    };
    let level = match &loaded {
        Some(Ok(config)) => args.resolve_log_level(&config.general.log_level),
        _ => args.resolve_log_level("info"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .init();

    tracing::info!("Starting Pharmaq v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match loaded {
        Some(Ok(config)) => {
            tracing::info!(path = %config_file.display(), "Configuration loaded");
            config
        }
        Some(Err(e)) => {
            tracing::warn!(path = %config_file.display(), error = %e, "Invalid config; using defaults");
            PharmaqConfig::default()
        }
        None => {
            tracing::info!(path = %config_file.display(), "No config file; using defaults");
            let config = PharmaqConfig::default();
            if args.init_config {
                config.save(&config_file)?;
            }
            config
        }
    };
    config.general.port = args.resolve_port(config.general.port);

    let client: Arc<dyn CompletionClient> = if args.offline {
        tracing::info!("Offline mode: language-model calls return canned replies");
        Arc::new(MockCompletionClient::new())
    } else {
        let client = OpenAiClient::from_config(&config.llm)?;
        tracing::info!(endpoint = %client.endpoint(), model = %config.llm.model, "Language model configured");
        Arc::new(client)
    };

    let exporter = EmailExporter::smtp(&config.email);
    tracing::info!(
        host = %config.email.smtp_host,
        default_port = config.email.default_port,
        "Email exporter ready"
    );

    let state = AppState::new(config.clone(), client, exporter);
    routes::start_server(&config, state).await?;

    Ok(())
}
