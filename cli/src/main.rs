//! Event Search Entry Point
//!
//! Drives semantic event search from the command line:
//! - `import`: load events from a JSON file
//! - `backfill`: embed events that have no vector yet
//! - `search`: rank events against a free-text query
//! - `stats`: report embedding coverage

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use event_search::{BackfillOptions, EmbeddingConfig, ModelIdentity, SearchConfig};
use event_search_cli::{import::load_events, CliError, SearchService};

#[derive(Parser)]
#[command(name = "event-search")]
#[command(about = "Semantic search over live events")]
#[command(version)]
struct Args {
    /// Data directory holding the event store
    #[arg(long, short, default_value = ".event-search")]
    data_dir: PathBuf,

    /// Directory with the embedding model weights
    #[arg(long)]
    models_path: Option<PathBuf>,

    /// Embedding model name
    #[arg(long, default_value = event_search::vector::DEFAULT_MODEL)]
    model: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import events from a JSON array
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Generate embeddings for stored events
    Backfill {
        /// Recompute embeddings even if they already exist
        #[arg(long)]
        force: bool,
        /// Limit the number of events to process (0 = all)
        #[arg(long, default_value_t = 0)]
        limit: usize,
        /// Also recompute embeddings made by a different model
        #[arg(long)]
        include_stale: bool,
    },
    /// Search events by meaning
    Search {
        /// Free-text query
        query: String,
        /// Only events scheduled in the future
        #[arg(long)]
        future: bool,
        /// Maximum number of results
        #[arg(long, default_value_t = event_search::rank::DEFAULT_TOP_K)]
        limit: usize,
        /// Minimum similarity a result must exceed
        #[arg(long, default_value_t = event_search::search::DEFAULT_MIN_SCORE)]
        min_score: f32,
    },
    /// Show embedding coverage
    Stats,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "event_search=info,event_search_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(args).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let embedding = EmbeddingConfig {
        model: ModelIdentity::new(args.model),
        models_path: args.models_path,
        ..Default::default()
    };
    let service = SearchService::new(embedding, SearchConfig::default());
    service.initialize(&args.data_dir).await?;

    let output = match args.command {
        Command::Import { file } => {
            let events = load_events(&file)?;
            let written = service.import(events).await?;
            tracing::info!("Imported {} events from {:?}", written, file);
            serde_json::json!({ "imported": written })
        }
        Command::Backfill {
            force,
            limit,
            include_stale,
        } => {
            let options = BackfillOptions {
                force,
                limit,
                include_stale,
                ..Default::default()
            };
            serde_json::to_value(service.backfill(options).await?)?
        }
        Command::Search {
            query,
            future,
            limit,
            min_score,
        } => {
            let config = SearchConfig {
                limit,
                min_score,
                ..Default::default()
            };
            serde_json::to_value(service.search(&query, future, Some(config)).await?)?
        }
        Command::Stats => service.stats().await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
