//! Batch CLI: read sites from a CSV, extract pricing, checkpoint progress.

mod config;
mod input;

use anyhow::{Context, Result};
use clap::Parser;
use secrecy::ExposeSecret;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use pricing_extraction::ai::OpenRouterModel;
use pricing_extraction::{
    BatchConfig, BatchRunner, CheckpointStore, ExistenceChecker, FetchStrategy, HttpFetcher,
    PageFetcher, RenderedFetcher, SiteConfig, SitePipeline,
};

use config::Config;

#[derive(Parser)]
#[command(name = "pricing-batch", about = "Discover and extract pricing from company websites")]
struct Cli {
    /// CSV file with `name` and `website` columns
    input: PathBuf,

    /// Final results file (checkpoint lives next to it)
    #[arg(long, default_value = "pricing_results.json")]
    output: PathBuf,

    /// Extract content through the rendering service instead of plain HTTP
    #[arg(long)]
    rendered: bool,

    /// Wall-clock timeout per site, seconds
    #[arg(long)]
    site_timeout_secs: Option<u64>,

    /// Ranked URLs to try per site; 0 means no cap
    #[arg(long, default_value_t = 5)]
    max_url_attempts: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pricing_extraction=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let items = input::read_items(&cli.input)?;
    info!(count = items.len(), input = %cli.input.display(), "Loaded batch items");

    let model = OpenRouterModel::new(config.openrouter_api_key.expose_secret())
        .with_model(&config.model)
        .with_attribution(&config.site_url, &config.site_name);

    let strategy = if cli.rendered {
        FetchStrategy::Rendered
    } else {
        FetchStrategy::Http
    };

    let discovery_fetcher = Arc::new(HttpFetcher::new());
    let content_fetcher: Arc<dyn PageFetcher> = match strategy {
        FetchStrategy::Rendered => {
            let rendering_url = config
                .rendering_url
                .context("RENDERING_URL must be set when --rendered is used")?;
            Arc::new(RenderedFetcher::new(rendering_url, config.rendering_token))
        }
        FetchStrategy::Http => discovery_fetcher.clone(),
    };

    let attempts = if cli.max_url_attempts == 0 {
        None
    } else {
        Some(cli.max_url_attempts)
    };

    let pipeline = SitePipeline::new(
        discovery_fetcher,
        content_fetcher,
        Arc::new(ExistenceChecker::new()),
        Arc::new(model),
    )
    .with_site_config(SiteConfig::default().with_max_url_attempts(attempts));

    let runner = BatchRunner::new(pipeline, CheckpointStore::new(&cli.output))
        .with_config(BatchConfig::default().with_site_timeout_secs(cli.site_timeout_secs));

    // First ctrl-c stops between sites; the checkpoint already covers every
    // completed item
    let cancel = runner.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupt received, stopping after the current site...");
            cancel.cancel();
        }
    });

    let summary = runner.run(&items).await?;

    println!();
    println!("Processing complete");
    println!(
        "Total: {}, Successful: {}, Failed: {}",
        summary.total,
        summary.successful,
        summary.processed - summary.successful
    );
    println!("Results saved to: {}", cli.output.display());

    if !summary.failed.is_empty() {
        println!();
        println!("Failed items ({}):", summary.failed.len());
        for (name, reason) in &summary.failed {
            println!("   - {name}: {reason}");
        }
    }

    if summary.cancelled {
        println!();
        println!("Run was interrupted. Checkpoint saved; run again to resume.");
    }

    Ok(())
}
