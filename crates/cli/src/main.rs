mod cli_types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marquee_core::{
    load_config, validate_config, Extractor, Image, Movie, MovieEnricher, PluginResult,
    SearchIndexer, SqliteLibrary, StoreError, Studio,
};

use cli_types::{Cli, Command};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = std::env::var("MARQUEE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Database path: {:?}", config.database.path);
    let library = Arc::new(
        SqliteLibrary::new(&config.database.path).context("Failed to open library database")?,
    );
    let extractor = Extractor::new(library.clone());

    match cli.command {
        Command::Extract { text } => {
            let found = extractor
                .extract_all(&text)
                .await
                .context("Extraction failed")?;
            println!("{}", serde_json::to_string_pretty(&found)?);
        }
        Command::Merge { movie, result } => {
            let movie: Movie = read_json(&movie)?;
            let result = PluginResult::from_json(read_json(&result)?);

            let enricher = MovieEnricher::new(
                extractor,
                library,
                Arc::new(LogIndexer),
                config.plugins.clone(),
            );
            let merged = enricher
                .merge_plugin_result(movie, &result)
                .await
                .context("Merge failed")?;
            println!("{}", serde_json::to_string_pretty(&merged)?);
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))
}

/// No search index is attached to the CLI; index requests are only logged.
struct LogIndexer;

#[async_trait]
impl SearchIndexer for LogIndexer {
    async fn index_studios(&self, studios: &[Studio]) -> Result<(), StoreError> {
        for studio in studios {
            info!("Would index studio {} ({})", studio.id, studio.name);
        }
        Ok(())
    }

    async fn index_images(&self, images: &[Image]) -> Result<(), StoreError> {
        for image in images {
            info!("Would index image {} ({})", image.id, image.name);
        }
        Ok(())
    }
}
