//! # shardsmith CLI
//!
//! Inspect the shard corpus and the document pipeline from the command line.
//!
//! ## Usage
//!
//! ```bash
//! shardsmith --config ./config/shardsmith.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `shardsmith shards` | List the loaded shard catalog |
//! | `shardsmith select` | Show which shards a request would pick |
//! | `shardsmith render` | Print the style block for a request |
//! | `shardsmith parse <path>` | Print a document's header metadata |
//! | `shardsmith chunk [path]` | Chunk one document or the documents directory |
//!
//! ## Examples
//!
//! ```bash
//! # Lexical selection for a tagged request
//! shardsmith select --word command --word ethics -k 6
//!
//! # Sampled fallback, reproducible for a given hint
//! shardsmith render --hint "A Romulan ship decloaks off our port bow."
//!
//! # Chunk every configured document as JSON lines
//! shardsmith chunk --json
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use shardsmith::models::SelectionRequest;
use shardsmith::{catalog, config, ingest};

/// shardsmith: voice shard selection and document chunking.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. When the file does not exist, built-in defaults are used.
#[derive(Parser)]
#[command(
    name = "shardsmith",
    about = "shardsmith: voice shard selection and document chunking for prompt assembly",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/shardsmith.toml")]
    config: PathBuf,

    /// Enable debug logging on stderr (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the loaded shard catalog.
    Shards,

    /// Select shards for a request and print them.
    ///
    /// With `--word`, shards are ranked by keyword overlap. Without it, the
    /// top-priority shard is kept and the rest are sampled, seeded by `--hint`
    /// (or the current second when no hint is given).
    Select {
        #[command(flatten)]
        request: RequestArgs,

        /// Print full shard records as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the style block for a request.
    Render {
        #[command(flatten)]
        request: RequestArgs,
    },

    /// Parse a document header and print its metadata as JSON.
    Parse {
        /// Path to the document.
        path: PathBuf,
    },

    /// Chunk a document, or every document under `[documents].dir`.
    Chunk {
        /// Single document to chunk. Defaults to the configured directory.
        path: Option<PathBuf>,

        /// Override `[chunking].max_chars`.
        #[arg(long)]
        max_chars: Option<usize>,

        /// Override `[chunking].overlap`.
        #[arg(long)]
        overlap: Option<usize>,

        /// Print chunk records as JSON lines.
        #[arg(long)]
        json: bool,

        /// Only print document and chunk counts.
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(clap::Args)]
struct RequestArgs {
    /// Query word matched against shard keywords (repeatable).
    #[arg(long = "word")]
    words: Vec<String>,

    /// Number of shards to select. Defaults to `[selection].k`.
    #[arg(short)]
    k: Option<usize>,

    /// Seed material for sampled selection.
    #[arg(long)]
    hint: Option<String>,
}

impl RequestArgs {
    fn into_request(self, default_k: usize) -> SelectionRequest {
        SelectionRequest {
            words: self.words,
            k: self.k.unwrap_or(default_k),
            hint: self.hint,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Parsing a single document needs no configuration.
    if let Commands::Parse { path } = &cli.command {
        return ingest::run_parse(path);
    }

    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Shards => {
            catalog::list_shards(&cfg)?;
        }
        Commands::Select { request, json } => {
            let request = request.into_request(cfg.selection.k);
            catalog::run_select(&cfg, &request, json)?;
        }
        Commands::Render { request } => {
            let request = request.into_request(cfg.selection.k);
            catalog::run_render(&cfg, &request)?;
        }
        Commands::Chunk {
            path,
            max_chars,
            overlap,
            json,
            dry_run,
        } => {
            ingest::run_chunk(&cfg, path.as_deref(), max_chars, overlap, json, dry_run)?;
        }
        Commands::Parse { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
