//! Command-line interface definitions for the corpus builder.
//!
//! Global options locate the corpus root and configuration; each pipeline
//! phase is a subcommand.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the corpus builder.
///
/// # Examples
///
/// ```sh
/// # Full pipeline into the current directory
/// corpus_builder all
///
/// # Regenerate only the manifest of another corpus
/// corpus_builder --root ./corpus manifest
///
/// # Download with a custom configuration
/// corpus_builder --config corpus.yaml fetch
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Corpus root holding sources/, extracted/, metadata/ and logs/
    #[arg(short, long, env = "CORPUS_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Optional path to a YAML config file (defaults to <root>/corpus.yaml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Download ERIC documents, Archive.org books and blog posts
    Fetch,
    /// Probe alternate blog slugs and scrape the ones that exist
    DiscoverBlogs,
    /// Search Archive.org for further items and write a report to logs/
    SearchArchive,
    /// Extract text from every downloaded PDF
    Extract,
    /// Re-extract text from saved blog HTML
    ExtractHtml,
    /// Write placeholder summaries for unobtainable items
    Placeholders,
    /// Scan the corpus and write the manifest
    Manifest,
    /// Run fetch, extract, placeholders and manifest in order
    All,
}

impl Command {
    /// Name used for the per-run log file.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Fetch => "fetch",
            Command::DiscoverBlogs => "discover_blogs",
            Command::SearchArchive => "search_archive",
            Command::Extract => "extract",
            Command::ExtractHtml => "extract_html",
            Command::Placeholders => "placeholders",
            Command::Manifest => "manifest",
            Command::All => "all",
        }
    }

    /// Whether the subcommand talks to the network.
    pub fn needs_http(&self) -> bool {
        matches!(
            self,
            Command::Fetch | Command::DiscoverBlogs | Command::SearchArchive | Command::All
        )
    }
}
