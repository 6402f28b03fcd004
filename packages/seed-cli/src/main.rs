//! Operator CLI for the directory seeding pipeline.
//!
//! Each stage reads the newest snapshot of its input kind from the data
//! directory and writes a new one, so stages can be rerun independently.

mod config;
mod seeds;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use seed_pipeline::crawl::crawl_and_save;
use seed_pipeline::{
    new_version, BatchDriver, CallCounters, HttpImageFetcher, HttpScraper, ModelTiers,
    Orchestrator, PostgresCatalog, RawRecord, Seeder, SnapshotKind, SnapshotStore,
    SupabaseStorage, Taxonomy,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{read_url_file, Config};

const IMAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "seed")]
#[command(about = "Crawl, enrich and seed the resource directory")]
struct Cli {
    /// Directory holding stage snapshots (overrides SEED_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape seed URLs into a raw snapshot
    Crawl {
        /// File with one URL per line instead of the built-in list
        #[arg(long)]
        urls_file: Option<PathBuf>,
    },

    /// Enrich the latest raw snapshot
    Enrich,

    /// Upload logos and upsert products from the latest enriched snapshot
    Seed,

    /// Crawl, enrich and seed in sequence
    Run {
        #[arg(long)]
        urls_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,seed_pipeline=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data_dir.clone());
    let store = SnapshotStore::new(data_dir);
    tracing::info!(data_dir = %store.dir().display(), "Configuration loaded");

    match cli.command {
        Commands::Crawl { urls_file } => cmd_crawl(&config, &store, urls_file.as_deref()).await,
        Commands::Enrich => cmd_enrich(&config, &store).await,
        Commands::Seed => cmd_seed(&config, &store).await,
        Commands::Run { urls_file } => {
            tracing::info!("Starting the pipeline");
            cmd_crawl(&config, &store, urls_file.as_deref())
                .await
                .context("Crawl stage failed")?;
            cmd_enrich(&config, &store)
                .await
                .context("Enrich stage failed")?;
            cmd_seed(&config, &store).await.context("Seed stage failed")?;
            println!("{}", style("Pipeline completed").green().bold());
            Ok(())
        }
    }
}

async fn load_urls(urls_file: Option<&Path>) -> Result<Vec<String>> {
    match urls_file {
        Some(path) => {
            let contents = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            read_url_file(&contents)
        }
        None => Ok(seeds::SEED_URLS.iter().map(|u| u.to_string()).collect()),
    }
}

async fn cmd_crawl(config: &Config, store: &SnapshotStore, urls_file: Option<&Path>) -> Result<()> {
    let urls = load_urls(urls_file).await?;
    let scraper = HttpScraper::new(&config.crawl).context("Failed to build HTTP client")?;

    let report = crawl_and_save(&scraper, &urls, &config.crawl, store, &new_version())
        .await
        .context("Failed to save raw snapshot")?;

    for abandoned in &report.abandoned {
        tracing::warn!(
            url = %abandoned.url,
            attempts = abandoned.attempts,
            error = %abandoned.error,
            "URL abandoned"
        );
    }
    println!(
        "{} Crawled {} pages, abandoned {}",
        style("crawl").cyan().bold(),
        report.records.len(),
        report.abandoned.len()
    );
    Ok(())
}

async fn cmd_enrich(config: &Config, store: &SnapshotStore) -> Result<()> {
    let llm = config.llm()?;
    tracing::info!(
        provider = %llm.selection.provider,
        fast_model = %llm.selection.fast_model,
        smart_model = %llm.selection.smart_model,
        "Model provider resolved"
    );

    let (source_version, records) = store
        .read_latest::<RawRecord>(SnapshotKind::Raw)
        .await
        .context("Failed to load raw snapshot")?;
    tracing::info!(
        source_version = %source_version,
        count = records.len(),
        "Enriching raw snapshot"
    );

    let models = ModelTiers::from_selection(
        &llm.selection,
        llm.api_key.clone(),
        config.enrich.call_timeout,
    );
    let orchestrator = Orchestrator::new(
        models,
        Arc::new(Taxonomy::default()),
        config.enrich.clone(),
        Arc::new(CallCounters::new()),
    );

    let outcome = BatchDriver::new(orchestrator)
        .run_and_persist(records, store, &new_version())
        .await
        .context("Failed to save enrichment snapshots")?;

    let summary = outcome.summary;
    println!(
        "{} Raw: {}. Enriched: {}. Failed: {}. Model calls: {} fast, {} smart.",
        style("enrich").cyan().bold(),
        summary.raw,
        summary.enriched,
        summary.failed,
        summary.calls.fast,
        summary.calls.smart
    );
    Ok(())
}

async fn cmd_seed(config: &Config, store: &SnapshotStore) -> Result<()> {
    let storage = config.storage()?;
    let object_store = SupabaseStorage::new(storage.url.clone(), storage.service_key.clone());
    let fetcher =
        HttpImageFetcher::new(IMAGE_FETCH_TIMEOUT).context("Failed to build HTTP client")?;
    let catalog = PostgresCatalog::connect(config.database_url()?)
        .await
        .context("Failed to connect to database")?;

    let seeder = Seeder::new(
        Arc::new(object_store),
        Arc::new(fetcher),
        Arc::new(catalog),
        config.seed.clone(),
    );

    let report = seeder
        .seed_latest(store, &new_version())
        .await
        .context("Failed to seed from enriched snapshot")?;

    println!(
        "{} Seeding completed. Successfully seeded: {}. Failed: {}.",
        style("seed").cyan().bold(),
        report.seeded,
        report.failures.len()
    );
    Ok(())
}
