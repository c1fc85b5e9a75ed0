//! # Amharic RAG CLI (`amrag`)
//!
//! ## Usage
//!
//! ```bash
//! amrag --config ./config/amrag.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `amrag init` | Create the SQLite database and the configured collection |
//! | `amrag ingest <file>` | Replace the collection with the chunks of one document |
//! | `amrag ask "<question>"` | Answer a question from the collection |
//! | `amrag chunks <file>` | Print the chunks a file would produce, without storing them |
//! | `amrag stats` | Print the collection's record count |
//! | `amrag clear` | Empty the collection |
//! | `amrag serve` | Start the HTTP chat server |

use amharic_rag::answer::answer_question;
use amharic_rag::config::{self, Config};
use amharic_rag::context::{self, AppContext};
use amharic_rag::ingest::{self, ingest_document};
use amharic_rag::models::IngestOutcome;
use amharic_rag::server;
use amharic_rag::store::VectorStore;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Amharic retrieval-augmented question answering.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/amrag.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "amrag",
    about = "Amharic RAG: ingest Amharic documents and answer questions about them",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/amrag.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema and the configured collection.
    ///
    /// Idempotent.
    Init,

    /// Ingest a `.pdf` or `.txt` file.
    ///
    /// Drops and recreates the target collection, then stores one record
    /// per chunk. Prints the outcome as JSON and exits non-zero on error.
    Ingest {
        file: PathBuf,

        /// Collection to replace (defaults to `[store].collection`).
        #[arg(long)]
        collection: Option<String>,

        /// Sentences per chunk (defaults to `[chunking].max_sentences_per_chunk`).
        #[arg(long)]
        max_sentences: Option<usize>,
    },

    /// Answer a question from the configured collection.
    Ask {
        question: String,

        /// Nearest chunks to use as context (defaults to `[retrieval].n_results`).
        #[arg(long)]
        n_results: Option<usize>,
    },

    /// Dry run: print the chunks a file would produce.
    ///
    /// Touches neither the embedder nor the store.
    Chunks {
        file: PathBuf,

        #[arg(long)]
        max_sentences: Option<usize>,
    },

    /// Print the configured collection and its record count.
    Stats,

    /// Delete and recreate the configured collection.
    Clear,

    /// Start the HTTP chat server on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let store = context::open_store(&cfg).await?;
            store.get_or_create_collection(&cfg.store.collection).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ingest {
            file,
            collection,
            max_sentences,
        } => {
            run_ingest(cfg, file, collection, max_sentences).await?;
        }
        Commands::Ask {
            question,
            n_results,
        } => {
            let n_results = n_results.unwrap_or(cfg.retrieval.n_results);
            if n_results == 0 {
                bail!("--n-results must be >= 1");
            }
            let ctx = AppContext::from_config(cfg).await?;
            println!("{}", answer_question(&ctx, &question, n_results).await);
        }
        Commands::Chunks {
            file,
            max_sentences,
        } => {
            run_chunks(&cfg, file, max_sentences).await?;
        }
        Commands::Stats => {
            let store = context::open_store(&cfg).await?;
            let count = store.count(&cfg.store.collection).await?;
            println!("Collection: {}", cfg.store.collection);
            println!("Records:    {}", count);
        }
        Commands::Clear => {
            let store = context::open_store(&cfg).await?;
            context::reset_collection(store.as_ref(), &cfg.store.collection).await?;
            println!("Collection '{}' cleared.", cfg.store.collection);
        }
        Commands::Serve => {
            let ctx = AppContext::from_config(cfg).await?;
            server::run_server(Arc::new(ctx)).await?;
        }
    }

    Ok(())
}

fn chunk_size(cfg: &Config, flag: Option<usize>) -> Result<usize> {
    let size = flag.unwrap_or(cfg.chunking.max_sentences_per_chunk);
    if size == 0 {
        bail!("--max-sentences must be >= 1");
    }
    Ok(size)
}

async fn run_ingest(
    cfg: Config,
    file: PathBuf,
    collection: Option<String>,
    max_sentences: Option<usize>,
) -> Result<()> {
    let max_sentences = chunk_size(&cfg, max_sentences)?;
    let collection = collection.unwrap_or_else(|| cfg.store.collection.clone());
    let ctx = AppContext::from_config(cfg).await?;

    let outcome = tokio::select! {
        outcome = ingest_document(&ctx, &file, &collection, max_sentences) => outcome,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("ingestion interrupted");
            IngestOutcome::error("Ingestion cancelled.")
        }
    };

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    if !outcome.is_success() {
        bail!("{}", outcome.message);
    }
    Ok(())
}

async fn run_chunks(cfg: &Config, file: PathBuf, max_sentences: Option<usize>) -> Result<()> {
    let max_sentences = chunk_size(cfg, max_sentences)?;
    let document = ingest::load(&file).await?;
    let chunks = ingest::prepare_chunks(&document, max_sentences)?;

    for chunk in &chunks {
        println!("[{}] {}", chunk.record_id(), chunk.text);
    }
    println!();
    println!(
        "{} chunks from {} ({} sentences per chunk)",
        chunks.len(),
        document.source_file,
        max_sentences
    );
    Ok(())
}
