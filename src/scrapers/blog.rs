//! American Diversity Report blog scraper.
//!
//! Each post lives at `<blog_base_url><slug>/`. The raw page is kept under
//! `sources/blog_posts/` and its main content is extracted right away, so a
//! fetched post always has a text artifact and a completed sidecar.
//!
//! Discovery probes slugs that are not in the fixed list yet. Slugs are
//! guesses, so a HEAD request decides whether a page is worth fetching.

use super::{HttpFetcher, politeness_delay};
use crate::catalog::{BLOG_POSTS, BLOG_RESOURCE, BlogPost, CANDIDATE_BLOG_POSTS};
use crate::config::CorpusConfig;
use crate::error::CorpusResult;
use crate::extract::html::{extract_to_file, record_extraction};
use crate::layout::CorpusLayout;
use crate::models::{FetchOutcome, MetadataSidecar, SourceInfo};
use crate::sidecar;
use crate::utils::now_iso;
use futures::stream::{self, StreamExt};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Base sidecar for a post before extraction details are added.
fn post_sidecar(post: &BlogPost, url: &str) -> MetadataSidecar {
    MetadataSidecar {
        id: Some(post.item_id()),
        title: Some(post.title.to_string()),
        resource_type: Some(BLOG_RESOURCE),
        series: Some(post.series.as_str().to_string()),
        source_info: Some(SourceInfo {
            url: Some(url.to_string()),
            downloaded_at: Some(now_iso()),
            archive_org_id: None,
        }),
        ..Default::default()
    }
}

/// Fetch one post, save its HTML, extract its text, and write its sidecar.
///
/// Returns the root-relative text path and the word count.
#[instrument(level = "info", skip_all, fields(slug = post.slug))]
pub async fn scrape_post(
    fetcher: &HttpFetcher,
    layout: &CorpusLayout,
    config: &CorpusConfig,
    post: &BlogPost,
    timeout: Duration,
) -> CorpusResult<(String, usize)> {
    let url = post.url(&config.blog_base_url);
    let html = fetcher.get_text(&url, timeout).await?;

    let stem = post.stem();
    let html_path = layout.source_path(BLOG_RESOURCE, &format!("{stem}.html"));
    if let Some(parent) = html_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&html_path, &html).await?;

    sidecar::save(
        &layout.metadata_path(BLOG_RESOURCE, stem),
        &post_sidecar(post, &url),
    )?;
    let words = extract_to_file(layout, stem, &html)?;
    record_extraction(layout, stem, &html_path, words)?;

    info!(words, "Saved blog post");
    Ok((layout.relative(&layout.extracted_path(BLOG_RESOURCE, stem)), words))
}

/// Scrape every post in the fixed list, one at a time.
#[instrument(level = "info", skip_all)]
pub async fn fetch_all(
    fetcher: &HttpFetcher,
    layout: &CorpusLayout,
    config: &CorpusConfig,
) -> Vec<FetchOutcome> {
    let outcomes: Vec<FetchOutcome> = stream::iter(BLOG_POSTS)
        .then(|post| async move {
            let outcome =
                match scrape_post(fetcher, layout, config, post, config.request_timeout()).await {
                    Ok((path, words)) => {
                        FetchOutcome::downloaded(&post.item_id(), post.title, path, Some(words))
                    }
                    Err(e) => {
                        error!(url = %post.url(&config.blog_base_url), error = %e, "Blog fetch failed");
                        FetchOutcome::failed(&post.item_id(), post.title, e)
                    }
                };
            politeness_delay(config.blog_delay_ms).await;
            outcome
        })
        .collect()
        .await;

    let downloaded = outcomes.iter().filter(|o| o.is_downloaded()).count();
    let words: usize = outcomes.iter().filter_map(|o| o.words).sum();
    info!(downloaded, attempted = outcomes.len(), words, "Blog posts done");
    outcomes
}

/// Probe candidate slugs and scrape the ones that exist.
///
/// Posts whose HTML is already saved are skipped without a request.
#[instrument(level = "info", skip_all)]
pub async fn discover(
    fetcher: &HttpFetcher,
    layout: &CorpusLayout,
    config: &CorpusConfig,
) -> Vec<FetchOutcome> {
    let mut outcomes = Vec::new();
    let mut skipped = 0;
    let mut not_found = 0;

    for post in CANDIDATE_BLOG_POSTS {
        let html_path = layout.source_path(BLOG_RESOURCE, &format!("{}.html", post.stem()));
        if html_path.exists() {
            debug!(slug = post.slug, "Already on disk");
            skipped += 1;
            continue;
        }

        let url = post.url(&config.blog_base_url);
        match fetcher.head_status(&url, config.probe_timeout()).await {
            Ok(status) if status == StatusCode::OK => {
                let outcome =
                    match scrape_post(fetcher, layout, config, post, config.request_timeout()).await
                    {
                        Ok((path, words)) => {
                            FetchOutcome::downloaded(&post.item_id(), post.title, path, Some(words))
                        }
                        Err(e) => {
                            error!(%url, error = %e, "Discovered post could not be scraped");
                            FetchOutcome::failed(&post.item_id(), post.title, e)
                        }
                    };
                outcomes.push(outcome);
            }
            Ok(status) => {
                warn!(%url, %status, "Not found");
                not_found += 1;
            }
            Err(e) => {
                warn!(%url, error = %e, "Probe failed");
                not_found += 1;
            }
        }
        politeness_delay(config.probe_delay_ms).await;
    }

    let found = outcomes.iter().filter(|o| o.is_downloaded()).count();
    info!(found, skipped, not_found, "Blog discovery done");
    outcomes
}
