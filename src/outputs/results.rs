//! Download report written after a `fetch` run.

use crate::layout::CorpusLayout;
use crate::models::{DownloadResults, FetchOutcome};
use crate::utils::write_json;
use std::error::Error;
use std::path::PathBuf;
use tracing::{info, instrument};

pub const RESULTS_FILE: &str = "download_results.json";

fn succeeded(outcomes: &[FetchOutcome]) -> usize {
    outcomes.iter().filter(|o| o.is_downloaded()).count()
}

/// Total words extracted from the blog posts of a run.
pub fn blog_words(results: &DownloadResults) -> usize {
    results.blog_posts.iter().filter_map(|o| o.words).sum()
}

/// Write `download_results.json` at the corpus root.
#[instrument(level = "info", skip_all)]
pub async fn write_results(
    results: &DownloadResults,
    layout: &CorpusLayout,
) -> Result<PathBuf, Box<dyn Error>> {
    let path = layout.root().join(RESULTS_FILE);
    write_json(&path, results).await?;
    info!(path = %path.display(), "Wrote download results");
    Ok(path)
}

/// Log per-phase success counts.
pub fn log_summary(results: &DownloadResults) {
    info!(
        downloaded = succeeded(&results.eric_docs),
        attempted = results.eric_docs.len(),
        "ERIC documents"
    );
    info!(
        downloaded = succeeded(&results.archive_books),
        attempted = results.archive_books.len(),
        "Archive.org books"
    );
    info!(
        downloaded = succeeded(&results.blog_posts),
        attempted = results.blog_posts.len(),
        words = blog_words(results),
        "Blog posts"
    );
}
