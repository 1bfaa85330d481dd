//! Archive.org book fetcher and search.
//!
//! Uses three public endpoints:
//!
//! - `metadata/<identifier>`: item description including its file list
//! - `download/<identifier>/<file>`: the file itself
//! - `advancedsearch.php`: Lucene-style search returning JSON
//!
//! Books in the lending library answer 403 on download; the fetch is then
//! recorded as failed and the book is covered by a placeholder instead.

use super::{HttpFetcher, describe_download, politeness_delay};
use crate::catalog::{ARCHIVE_BOOKS, ARCHIVE_SEARCH_QUERIES, ArchiveBook, BOOK_RESOURCE};
use crate::config::CorpusConfig;
use crate::error::{CorpusError, CorpusResult};
use crate::layout::CorpusLayout;
use crate::models::{ExtractionInfo, FetchOutcome, MetadataSidecar};
use crate::sidecar;
use crate::utils::{run_stamp, write_json};
use itertools::Itertools;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::path::PathBuf;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

const SEARCH_FIELDS: &[&str] = &["identifier", "title", "creator", "year", "mediatype"];
const SEARCH_ROWS: &str = "10";

#[derive(Debug, Default, Deserialize)]
struct ItemMetadata {
    #[serde(default)]
    files: Vec<ItemFile>,
}

#[derive(Debug, Deserialize)]
struct ItemFile {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    response: SearchDocs,
}

#[derive(Debug, Default, Deserialize)]
struct SearchDocs {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    identifier: Option<String>,
    title: Option<String>,
    // Either a string or a list of strings depending on the item.
    creator: Option<Value>,
    year: Option<Value>,
}

/// One unique item found by [`search_all`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub identifier: String,
    pub title: Option<String>,
    pub creator: Option<Value>,
    pub year: Option<Value>,
    pub url: String,
}

fn base(config: &CorpusConfig) -> &str {
    config.archive_base_url.trim_end_matches('/')
}

pub fn metadata_url(config: &CorpusConfig, identifier: &str) -> String {
    format!("{}/metadata/{}", base(config), identifier)
}

pub fn download_url(config: &CorpusConfig, identifier: &str, file_name: &str) -> String {
    format!(
        "{}/download/{}/{}",
        base(config),
        identifier,
        urlencoding::encode(file_name)
    )
}

pub fn details_url(config: &CorpusConfig, identifier: &str) -> String {
    format!("{}/details/{}", base(config), identifier)
}

pub fn search_url(config: &CorpusConfig, query: &str) -> CorpusResult<Url> {
    let mut url = Url::parse(&format!("{}/advancedsearch.php", base(config)))?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("q", query);
        for field in SEARCH_FIELDS {
            pairs.append_pair("fl[]", field);
        }
        pairs
            .append_pair("rows", SEARCH_ROWS)
            .append_pair("page", "1")
            .append_pair("output", "json");
    }
    Ok(url)
}

/// Name of the first PDF listed in an item's metadata document.
fn first_pdf_name(metadata_json: &str) -> CorpusResult<Option<String>> {
    let meta: ItemMetadata = serde_json::from_str(metadata_json)?;
    Ok(meta
        .files
        .into_iter()
        .map(|f| f.name)
        .find(|name| name.to_lowercase().ends_with(".pdf")))
}

fn parse_search_hits(config: &CorpusConfig, body: &str) -> CorpusResult<Vec<SearchHit>> {
    let parsed: SearchResponse = serde_json::from_str(body)?;
    Ok(parsed
        .response
        .docs
        .into_iter()
        .filter_map(|doc| {
            let identifier = doc.identifier?;
            Some(SearchHit {
                url: details_url(config, &identifier),
                identifier,
                title: doc.title,
                creator: doc.creator,
                year: doc.year,
            })
        })
        .collect())
}

fn book_sidecar(book: &ArchiveBook) -> MetadataSidecar {
    MetadataSidecar {
        id: Some(book.item_id.to_string()),
        title: Some(book.title.to_string()),
        resource_type: Some(BOOK_RESOURCE),
        year: Some(book.year),
        authors: book.authors.iter().map(|a| a.to_string()).collect(),
        publisher: Some(book.publisher.to_string()),
        extraction: Some(ExtractionInfo::pending()),
        ..Default::default()
    }
}

async fn resolve_pdf_name(
    fetcher: &HttpFetcher,
    config: &CorpusConfig,
    book: &ArchiveBook,
) -> CorpusResult<String> {
    if let Some(name) = book.pdf_name {
        return Ok(name.to_string());
    }
    let url = metadata_url(config, book.identifier);
    let body = fetcher.get_text(&url, config.request_timeout()).await?;
    first_pdf_name(&body)?.ok_or_else(|| {
        CorpusError::NotAvailable(format!("no PDF listed for {}", book.identifier))
    })
}

#[instrument(level = "info", skip_all, fields(identifier = %book.identifier))]
async fn fetch_book(
    fetcher: &HttpFetcher,
    layout: &CorpusLayout,
    config: &CorpusConfig,
    book: &ArchiveBook,
) -> CorpusResult<String> {
    let pdf_name = resolve_pdf_name(fetcher, config, book).await?;
    debug!(%pdf_name, "Resolved PDF");

    let url = download_url(config, book.identifier, &pdf_name);
    let dest = layout.source_path(BOOK_RESOURCE, &book.file_name());
    if let Err(e) = fetcher.download(&url, &dest, config.book_timeout()).await {
        if matches!(&e, CorpusError::Status { status, .. } if *status == StatusCode::FORBIDDEN) {
            warn!(%url, "Item is lending-only; borrowing is required");
        }
        return Err(e);
    }

    let (mut source_info, file_info) = describe_download(layout, &dest, &url)?;
    source_info.archive_org_id = Some(book.identifier.to_string());
    let sidecar_data = MetadataSidecar {
        source_info: Some(source_info),
        file_info: Some(file_info),
        ..book_sidecar(book)
    };
    sidecar::save(&layout.metadata_path(BOOK_RESOURCE, book.stem), &sidecar_data)?;
    Ok(layout.relative(&dest))
}

/// Download every Archive.org book in the catalog, one at a time.
#[instrument(level = "info", skip_all)]
pub async fn fetch_all(
    fetcher: &HttpFetcher,
    layout: &CorpusLayout,
    config: &CorpusConfig,
) -> Vec<FetchOutcome> {
    let mut outcomes = Vec::with_capacity(ARCHIVE_BOOKS.len());

    for book in ARCHIVE_BOOKS {
        info!(identifier = book.identifier, title = book.title, "Downloading Archive.org book");
        let outcome = match fetch_book(fetcher, layout, config, book).await {
            Ok(path) => FetchOutcome::downloaded(book.item_id, book.title, path, None),
            Err(e) => {
                error!(identifier = book.identifier, error = %e, "Archive.org download failed");
                FetchOutcome::failed(book.item_id, book.title, e)
            }
        };
        outcomes.push(outcome);
        politeness_delay(config.archive_delay_ms).await;
    }

    outcomes
}

/// Run every catalog search query and return the unique hits.
#[instrument(level = "info", skip_all)]
pub async fn search_all(fetcher: &HttpFetcher, config: &CorpusConfig) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    for query in ARCHIVE_SEARCH_QUERIES {
        info!(%query, "Searching Archive.org");
        let result = match search_url(config, query) {
            Ok(url) => fetcher
                .get_text(url.as_str(), config.request_timeout())
                .await
                .and_then(|body| parse_search_hits(config, &body)),
            Err(e) => Err(e),
        };
        match result {
            Ok(found) => {
                for hit in &found {
                    debug!(identifier = %hit.identifier, title = ?hit.title, "Found");
                }
                hits.extend(found);
            }
            Err(e) => error!(%query, error = %e, "Search failed"),
        }
        politeness_delay(config.probe_delay_ms).await;
    }

    let unique: Vec<SearchHit> = hits
        .into_iter()
        .unique_by(|h| h.identifier.clone())
        .collect();
    info!(count = unique.len(), "Unique Archive.org items found");
    unique
}

/// Write search hits to `logs/archive_search_<stamp>.json`.
pub async fn write_search_report(
    hits: &[SearchHit],
    layout: &CorpusLayout,
) -> Result<PathBuf, Box<dyn Error>> {
    let path = layout
        .logs_dir()
        .join(format!("archive_search_{}.json", run_stamp()));
    write_json(&path, &hits).await?;
    info!(path = %path.display(), "Wrote Archive.org search report");
    Ok(path)
}
