use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, Utc};
use clap::Parser;
use tracing::{error, info, warn};

use rm_core::{AggregateBullet, Result};
use rm_inference::{create_model, ModelConfig, ModelHandles, PeriodAggregator};
use rm_sources::{GoogleNewsFetcher, LogoFetcher, MonitorManager, WorldNewsEnricher};
use rm_storage::Ledger;

mod config;

use config::Config;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// File listing one topic per line.
    #[arg(long, default_value = "topics.txt")]
    topics: PathBuf,
    /// Directory holding the per-topic ledgers and the report table.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
    /// Directory topic logos are downloaded into.
    #[arg(long, default_value = "logos")]
    logos_dir: PathBuf,
    #[arg(long, default_value = "jsonl")]
    storage: String,
    #[arg(
        long,
        default_value = "gemini",
        help = "Model used for annotation. Available models: gemini (default), dummy"
    )]
    model: String,
    /// Articles published more than this many days ago are discarded during
    /// a fetch.
    #[arg(long, default_value_t = 2)]
    start_days: i64,
    /// How many days back the news search looks.
    #[arg(long, default_value_t = 7)]
    window_days: u32,
    /// Optional JSON file of few-shot sentiment examples.
    #[arg(long)]
    few_shots: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Fetch recent articles for every topic and merge them into the ledgers.
    Fetch,
    /// Label and summarize ledger rows still missing annotations.
    Annotate,
    /// Build the per-topic, per-timeframe bullet report.
    Report,
    /// Fetch, annotate and report in one pass.
    Run,
}

async fn run_fetch(manager: &MonitorManager, logos: &LogoFetcher, cli: &Cli, config: &Config) {
    let start_date = Utc::now().date_naive() - Duration::days(cli.start_days);
    for topic in &config.topics {
        if let Err(e) = logos.ensure_logo(topic).await {
            warn!(topic = %topic, error = %e, "logo download failed; continuing");
        }
        match manager
            .refresh_topic(topic, cli.window_days, start_date)
            .await
        {
            Ok(added) => info!(topic = %topic, added, "fetch finished"),
            Err(e) => error!(topic = %topic, error = %e, "fetch failed; continuing with next topic"),
        }
    }
}

async fn run_annotate(manager: &MonitorManager, config: &Config) {
    for topic in &config.topics {
        match manager.annotate_topic(topic).await {
            Ok(annotated) => info!(topic = %topic, annotated, "annotation finished"),
            Err(e) => {
                error!(topic = %topic, error = %e, "annotation failed; continuing with next topic")
            }
        }
    }
}

/// Aggregate each topic on its own so one broken topic cannot sink the whole
/// table, then replace the report file wholesale.
async fn run_report(aggregator: &PeriodAggregator, cli: &Cli, config: &Config) -> Result<()> {
    let mut table: Vec<AggregateBullet> = Vec::new();
    for topic in &config.topics {
        match aggregator
            .aggregate_all(std::slice::from_ref(topic))
            .await
        {
            Ok(rows) => table.extend(rows),
            Err(e) => {
                error!(topic = %topic, error = %e, "aggregation failed; continuing with next topic")
            }
        }
    }

    tokio::fs::create_dir_all(&cli.data_dir).await?;
    let path = cli.data_dir.join("bullets.json");
    let rendered = serde_json::to_string_pretty(&table)?;
    tokio::fs::write(&path, rendered).await?;
    info!(path = %path.display(), rows = table.len(), "report written");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let config = Config::load(&cli.topics, cli.few_shots.as_deref())?;
    info!(topics = config.topics.len(), "topics loaded");

    let store = rm_storage::create_store(cli.storage.as_str(), &cli.data_dir)?;
    let ledger = Ledger::new(store);
    info!("💾 Storage initialized successfully (using {})", cli.storage);

    let ModelHandles {
        classifier,
        summarizer,
    } = create_model(&ModelConfig {
        name: cli.model.clone(),
        api_key: config.gemini_api_key.clone(),
        few_shots: config.few_shots.clone(),
    })?;
    info!("🧠 Annotation model initialized successfully (using {})", cli.model);

    let fetcher = Arc::new(GoogleNewsFetcher::new()?);
    let enricher = Arc::new(WorldNewsEnricher::new(config.world_news_api_keys.clone())?);
    let logos = LogoFetcher::new(&cli.logos_dir)?;
    let manager = MonitorManager::new(
        ledger.clone(),
        fetcher,
        enricher,
        classifier,
        summarizer.clone(),
    );
    let aggregator = PeriodAggregator::new(ledger, summarizer);

    match cli.command {
        Commands::Fetch => run_fetch(&manager, &logos, &cli, &config).await,
        Commands::Annotate => run_annotate(&manager, &config).await,
        Commands::Report => run_report(&aggregator, &cli, &config).await?,
        Commands::Run => {
            run_fetch(&manager, &logos, &cli, &config).await;
            run_annotate(&manager, &config).await;
            run_report(&aggregator, &cli, &config).await?;
        }
    }

    Ok(())
}
