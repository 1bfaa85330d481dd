//! # Corpus Builder
//!
//! Builds a retrieval corpus from the published work of a single author:
//! downloads what is freely available, turns it into plain text, writes
//! placeholder summaries for what is not, and indexes everything in a JSON
//! manifest.
//!
//! ## Usage
//!
//! ```sh
//! corpus_builder --root ./corpus all
//! ```
//!
//! ## Architecture
//!
//! The pipeline runs in phases, each also available as its own subcommand:
//! 1. **Fetch**: download ERIC PDFs, Archive.org books, and blog posts
//! 2. **Extract**: turn every downloaded PDF into page-marked text
//! 3. **Placeholders**: write synthetic summaries for unobtainable items
//! 4. **Manifest**: scan the tree and write `manifest.json`
//!
//! Everything runs sequentially with a fixed pause between requests. A
//! failed item is logged and skipped; only setup problems stop the run.

use clap::Parser;
use std::error::Error;
use std::fs::File;
use std::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{EnvFilter, fmt as tfmt, prelude::*};

mod catalog;
mod cli;
mod config;
mod error;
mod extract;
mod layout;
mod models;
mod outputs;
mod placeholders;
mod scrapers;
mod sidecar;
mod utils;

use catalog::{BLOG_RESOURCE, BOOK_RESOURCE, ERIC_RESOURCE};
use cli::{Cli, Command};
use config::CorpusConfig;
use layout::CorpusLayout;
use models::{DownloadResults, ResourceType};
use outputs::{manifest, results};
use scrapers::{HttpFetcher, archive, blog, eric};
use utils::{ensure_writable_dir, now_iso, run_stamp};

/// Open `logs/<command>_<stamp>.log` under the corpus root.
fn open_run_log(layout: &CorpusLayout, command: Command) -> std::io::Result<File> {
    std::fs::create_dir_all(layout.logs_dir())?;
    File::create(
        layout
            .logs_dir()
            .join(format!("{}_{}.log", command.name(), run_stamp())),
    )
}

/// Console logging plus an ANSI-free copy of every line in the run log.
fn init_tracing(run_log: Option<File>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = tfmt::layer()
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(UtcTime::rfc_3339());

    let mirror = run_log.map(|file| {
        tfmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .with_timer(UtcTime::rfc_3339())
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(mirror)
        .init();
}

/// Download every catalog item and write `download_results.json`.
#[instrument(level = "info", skip_all)]
async fn run_fetch(
    fetcher: &HttpFetcher,
    layout: &CorpusLayout,
    config: &CorpusConfig,
) -> Result<DownloadResults, Box<dyn Error>> {
    layout.ensure_dirs(&[ERIC_RESOURCE, BOOK_RESOURCE, BLOG_RESOURCE])?;

    let mut download_results = DownloadResults {
        started_at: now_iso(),
        ..Default::default()
    };

    info!("Phase 1: ERIC documents");
    download_results.eric_docs = eric::fetch_all(fetcher, layout, config).await;

    info!("Phase 2: Archive.org books");
    download_results.archive_books = archive::fetch_all(fetcher, layout, config).await;

    info!("Phase 3: blog posts");
    download_results.blog_posts = blog::fetch_all(fetcher, layout, config).await;

    download_results.completed_at = Some(now_iso());
    results::write_results(&download_results, layout).await?;
    results::log_summary(&download_results);
    Ok(download_results)
}

#[instrument(level = "info", skip_all)]
async fn run_discovery(
    fetcher: &HttpFetcher,
    layout: &CorpusLayout,
    config: &CorpusConfig,
) -> Result<(), Box<dyn Error>> {
    layout.ensure_dirs(&[BLOG_RESOURCE])?;
    let outcomes = blog::discover(fetcher, layout, config).await;
    for outcome in outcomes.iter().filter(|o| o.is_downloaded()) {
        info!(id = %outcome.id, words = ?outcome.words, "New blog post");
    }
    Ok(())
}

#[instrument(level = "info", skip_all)]
async fn run_archive_search(
    fetcher: &HttpFetcher,
    layout: &CorpusLayout,
    config: &CorpusConfig,
) -> Result<(), Box<dyn Error>> {
    let hits = archive::search_all(fetcher, config).await;
    for hit in &hits {
        info!(identifier = %hit.identifier, title = ?hit.title, year = ?hit.year, url = %hit.url, "Archive.org item");
    }
    archive::write_search_report(&hits, layout).await?;
    Ok(())
}

async fn run_extract(layout: &CorpusLayout) {
    let (extracted, failed) = extract::pdf::extract_all(layout).await;
    if failed > 0 {
        warn!(extracted, failed, "Some PDFs could not be extracted");
    }
}

async fn run_extract_html(layout: &CorpusLayout) {
    let (extracted, failed) = extract::html::extract_saved_pages(layout).await;
    if failed > 0 {
        warn!(extracted, failed, "Some blog pages could not be extracted");
    }
}

fn run_placeholders(layout: &CorpusLayout) -> Result<(), Box<dyn Error>> {
    layout.ensure_dirs(&ResourceType::ALL)?;
    placeholders::generate_all(layout)?;
    Ok(())
}

#[instrument(level = "info", skip_all)]
async fn run_manifest(layout: &CorpusLayout, config: &CorpusConfig) -> Result<(), Box<dyn Error>> {
    let corpus_manifest = manifest::build_manifest(layout, config, now_iso());
    manifest::write_manifest(&corpus_manifest, layout, config).await?;
    manifest::log_summary(&corpus_manifest);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    let layout = CorpusLayout::new(args.root.clone());

    // --- Tracing init ---
    let run_log = open_run_log(&layout, args.command);
    let log_error = run_log.as_ref().err().map(ToString::to_string);
    init_tracing(run_log.ok());
    if let Some(e) = log_error {
        warn!(error = %e, "Could not open run log; logging to console only");
    }

    let start_time = std::time::Instant::now();
    info!(command = args.command.name(), root = %layout.root().display(), "corpus_builder starting up");
    debug!(?args, "Parsed CLI arguments");

    // Early check: the corpus root must be writable
    if let Err(e) = ensure_writable_dir(layout.root()).await {
        error!(
            path = %layout.root().display(),
            error = %e,
            "Corpus root is not writable (fix perms or choose a different --root)"
        );
        return Err(e);
    }

    let config = CorpusConfig::load(args.config.as_deref(), layout.root())?;
    let fetcher = if args.command.needs_http() {
        Some(HttpFetcher::new(&config)?)
    } else {
        None
    };

    match (args.command, fetcher.as_ref()) {
        (Command::Fetch, Some(fetcher)) => {
            run_fetch(fetcher, &layout, &config).await?;
        }
        (Command::DiscoverBlogs, Some(fetcher)) => run_discovery(fetcher, &layout, &config).await?,
        (Command::SearchArchive, Some(fetcher)) => {
            run_archive_search(fetcher, &layout, &config).await?
        }
        (Command::Extract, _) => run_extract(&layout).await,
        (Command::ExtractHtml, _) => run_extract_html(&layout).await,
        (Command::Placeholders, _) => run_placeholders(&layout)?,
        (Command::Manifest, _) => run_manifest(&layout, &config).await?,
        (Command::All, Some(fetcher)) => {
            run_fetch(fetcher, &layout, &config).await?;
            run_extract(&layout).await;
            run_placeholders(&layout)?;
            run_manifest(&layout, &config).await?;
        }
        (command, None) => {
            return Err(format!("{} requires an HTTP client", command.name()).into());
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        elapsed_secs = elapsed.as_secs_f64(),
        command = args.command.name(),
        "corpus_builder finished"
    );
    Ok(())
}
