//! Ragbridge CLI
//!
//! Retrieve RAGFlow context and augment LLM requests from the terminal.

use anyhow::Result;
use clap::Parser;
use ragbridge_core::{ProviderRegistry, RagConfig};

mod app;
mod commands;

use app::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let loaded = match cli.config {
        Some(ref path) => RagConfig::load_from(path),
        None => RagConfig::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    let registry = ProviderRegistry::from_config(&config.providers)?;

    match cli.command {
        Commands::Retrieve(args) => commands::retrieve::run(args, config, &registry, cli.format).await,
        Commands::Augment(args) => commands::augment::run(args, config, &registry).await,
        Commands::Config => commands::config::run(&config, cli.format),
    }
}
