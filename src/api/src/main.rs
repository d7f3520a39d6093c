//! keiba-scrape
//!
//! CLI for extracting netkeiba race cards and horse profiles as JSON.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use keiba_scrape::cli::{self, Cli, Commands};
use keiba_scrape::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keiba_scrape=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load_from(cli.config.as_deref())?;
    tracing::debug!("Configuration loaded: {:?}", config);

    match cli.command {
        Commands::Race { target, run } => cli::run_race(config, target, run).await,
        Commands::Horses { url, run } => cli::run_horses(config, url, run).await,
    }
}
