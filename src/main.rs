//! `hopon` command-line entrypoint.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use hopon::config::Config;
use hopon::constants::LOG_FILENAME;
use hopon::dataset::{Project, load_projects};
use hopon::embedding::EncoderHandle;
use hopon::{EmbeddingCache, ProjectMatcher, SearchOutcome};

#[derive(Parser, Debug)]
#[command(
    name = "hopon",
    about = "Semantic search and similar-project lookup over a project dataset"
)]
struct Cli {
    /// Project dataset (.json array or .jsonl); overrides HOPON_DATASET_PATH
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Embedding cache file; overrides HOPON_CACHE_PATH
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode the dataset (or load matching embeddings from the cache)
    Encode,
    /// Rank every project by relevance to a free-text query
    Search {
        query: String,
        /// Keep only the best N rows
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// List projects most similar to a given project id
    Similar {
        id: String,
        /// Defaults to HOPON_SIMILAR_TOP_K
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Inspect or remove the embedding cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    Info,
    Clear,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(dataset) = cli.dataset {
        config.dataset_path = Some(dataset);
    }
    if let Some(cache) = cli.cache {
        config.cache_path = cache;
    }
    config.validate()?;

    init_tracing(&config.log_dir);

    let mut out = io::stdout().lock();
    let cache = EmbeddingCache::new(config.cache_path.clone());

    match cli.command {
        Command::Cache { action } => run_cache(action, &cache, &mut out),
        Command::Encode => {
            let (matcher, projects) = build_matcher(&config, cache)?;
            let outcome = matcher.encode_projects(&projects);
            write_json(&mut out, &outcome)
        }
        Command::Search { query, top_k } => {
            let (matcher, projects) = build_matcher(&config, cache)?;
            matcher.encode_projects(&projects);

            match matcher.search(&query, &projects, top_k) {
                SearchOutcome::Ranked(ranking) => {
                    for row in ranking.to_json_rows()? {
                        write_json(&mut out, &row)?;
                    }
                }
                SearchOutcome::Passthrough(rows) => {
                    tracing::warn!("Semantic search unavailable; listing projects unranked");
                    for row in rows.iter().take(top_k.unwrap_or(usize::MAX)) {
                        write_json(&mut out, row)?;
                    }
                }
            }
            Ok(())
        }
        Command::Similar { id, top_k } => {
            let (matcher, projects) = build_matcher(&config, cache)?;
            matcher.encode_projects(&projects);

            let top_k = top_k.unwrap_or(config.similar_top_k);
            for row in matcher.similar(&id, &projects, top_k).to_json_rows()? {
                write_json(&mut out, &row)?;
            }
            Ok(())
        }
    }
}

fn build_matcher(config: &Config, cache: EmbeddingCache) -> Result<(ProjectMatcher, Vec<Project>)> {
    let Some(dataset_path) = &config.dataset_path else {
        bail!("no dataset configured; pass --dataset or set HOPON_DATASET_PATH");
    };

    let projects = load_projects(dataset_path)
        .with_context(|| format!("failed to load dataset {}", dataset_path.display()))?;

    let encoder = EncoderHandle::load(config.encoder_config());
    Ok((ProjectMatcher::new(encoder, cache), projects))
}

fn run_cache(action: CacheAction, cache: &EmbeddingCache, out: &mut impl Write) -> Result<()> {
    match action {
        CacheAction::Info => match cache.info() {
            Some(info) => write_json(out, &info),
            None => write_json(
                out,
                &serde_json::json!({ "path": cache.path(), "present": false }),
            ),
        },
        CacheAction::Clear => {
            let removed = cache.clear()?;
            write_json(
                out,
                &serde_json::json!({ "path": cache.path(), "removed": removed }),
            )
        }
    }
}

fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Logs to stderr and, when `log_dir` is writable, to a per-session `hopon.log`.
fn init_tracing(log_dir: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, log_error) = match open_session_log(log_dir) {
        Ok(file) => (
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file))),
            None,
        ),
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .init();

    if let Some(e) = log_error {
        tracing::warn!(log_dir = %log_dir.display(), error = %e, "Session log disabled");
    }
}

fn open_session_log(log_dir: &Path) -> io::Result<File> {
    fs::create_dir_all(log_dir)?;
    File::create(log_dir.join(LOG_FILENAME))
}
