//! CLI commands for keiba-scrape.
//!
//! Supports race mode (race card plus every horse) and horse-only mode.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::scraper::{race_target, HttpSource, RaceScraper};

#[derive(Parser)]
#[command(name = "keiba-scrape")]
#[command(version, about = "Extract race cards and horse profiles from netkeiba.com", long_about = None)]
pub struct Cli {
    /// Config file (toml, json or yaml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape a race card and every horse entered in it
    Race {
        /// Race card URL or 12-digit race id
        #[arg(value_name = "URL_OR_RACE_ID")]
        target: String,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Scrape every horse linked from a listing page
    Horses {
        /// Listing page URL
        #[arg(value_name = "URL")]
        url: String,

        #[command(flatten)]
        run: RunArgs,
    },
}

/// Options shared by both modes
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Write JSON here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Horse pages fetched at once
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Fail a horse on a malformed result row instead of skipping the row
    #[arg(long)]
    pub strict_rows: bool,
}

impl RunArgs {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(n) = self.concurrency {
            config.scraper.max_concurrent_fetches = n;
        }
        if self.strict_rows {
            config.scraper.skip_malformed_rows = false;
        }
    }
}

fn build_scraper(config: &AppConfig) -> anyhow::Result<RaceScraper> {
    let source = HttpSource::new(&config.scraper.user_agent, config.scraper.timeout())
        .context("Failed to build HTTP client")?;
    Ok(RaceScraper::new(Arc::new(source), config.scraper.options()))
}

/// Scrape a race and emit it as JSON.
pub async fn run_race(mut config: AppConfig, target: String, run: RunArgs) -> anyhow::Result<()> {
    run.apply(&mut config);
    let url = race_target(&target);
    info!("Scraping race {}", url);

    let race = build_scraper(&config)?
        .scrape_race(&url)
        .await
        .with_context(|| format!("Failed to scrape race {}", url))?;

    info!("Scraped {} horses for {}", race.horses.len(), race.name);
    write_output(&race, run.output.as_deref())
}

/// Scrape every horse on a listing page and emit them as JSON.
pub async fn run_horses(mut config: AppConfig, url: String, run: RunArgs) -> anyhow::Result<()> {
    run.apply(&mut config);
    info!("Scraping horses from {}", url);

    let horses = build_scraper(&config)?
        .scrape_horse_list(&url)
        .await
        .with_context(|| format!("Failed to scrape horses from {}", url))?;

    info!("Scraped {} horses", horses.len());
    write_output(&horses, run.output.as_deref())
}

/// Pretty-printed JSON to `path`, or stdout when `None`.
pub fn write_output<T: Serialize>(value: &T, path: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Race, Surface};

    #[test]
    fn test_parse_race_command() {
        let cli = Cli::parse_from([
            "keiba-scrape",
            "race",
            "202244111711",
            "-j",
            "4",
            "--strict-rows",
            "-o",
            "out/race.json",
        ]);
        match cli.command {
            Commands::Race { target, run } => {
                assert_eq!(target, "202244111711");
                assert_eq!(run.concurrency, Some(4));
                assert!(run.strict_rows);
                assert_eq!(run.output, Some(PathBuf::from("out/race.json")));
            }
            Commands::Horses { .. } => panic!("expected race command"),
        }
    }

    #[test]
    fn test_parse_horses_command_with_config() {
        let cli = Cli::parse_from([
            "keiba-scrape",
            "horses",
            "https://nar.netkeiba.com/race/shutuba.html?race_id=202244111711",
            "--config",
            "keiba.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("keiba.toml")));
        assert!(matches!(cli.command, Commands::Horses { .. }));
    }

    #[test]
    fn test_run_args_apply() {
        let mut config = AppConfig::default();
        RunArgs {
            concurrency: Some(3),
            strict_rows: true,
            ..Default::default()
        }
        .apply(&mut config);
        assert_eq!(config.scraper.max_concurrent_fetches, 3);
        assert!(!config.scraper.skip_malformed_rows);
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("output.json");
        let race = Race {
            name: "ゴールドカップ".to_string(),
            track: "大井".to_string(),
            surface_type: Surface::Dirt,
            distance_meters: 1400,
            horses: vec![],
        };

        write_output(&race, Some(&path)).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["name"], "ゴールドカップ");
        assert_eq!(written["distanceMeters"], 1400);
    }
}
