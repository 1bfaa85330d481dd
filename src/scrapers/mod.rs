//! Fetchers for the remote sources of the corpus.
//!
//! This module contains one submodule per remote source, all sharing the
//! [`HttpFetcher`] client defined here. Each fetcher walks a fixed list from
//! [`crate::catalog`], one item at a time:
//!
//! 1. **Fetch**: GET the item and save the raw bytes under `sources/<type>/`
//! 2. **Record**: write a metadata sidecar with URL, timestamp, size, checksum
//! 3. **Pause**: sleep a fixed delay before the next request
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | ERIC | [`eric`] | Fulltext PDF | Fixed file server URL per ERIC id |
//! | Archive.org | [`archive`] | Metadata + download API | Lending-only items answer 403 |
//! | American Diversity Report | [`blog`] | HTML scraping | Text extracted on the spot |
//!
//! A failed item is logged with its URL, recorded as failed, and skipped.
//! There is no retry.

pub mod archive;
pub mod blog;
pub mod eric;

use crate::config::CorpusConfig;
use crate::error::{CorpusError, CorpusResult};
use crate::layout::{CorpusLayout, partial_path};
use crate::models::{FileInfo, SourceInfo};
use crate::utils::{file_size_and_md5, now_iso};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

/// HTTP client shared by all fetchers.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &CorpusConfig) -> CorpusResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { client })
    }

    /// GET `url` and return the body as text. Non-2xx is an error.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_text(&self, url: &str, timeout: Duration) -> CorpusResult<String> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CorpusError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(response.text().await?)
    }

    /// HEAD `url`, following redirects, and return the final status.
    #[instrument(level = "debug", skip(self))]
    pub async fn head_status(&self, url: &str, timeout: Duration) -> CorpusResult<StatusCode> {
        let response = self.client.head(url).timeout(timeout).send().await?;
        Ok(response.status())
    }

    /// Stream `url` into `dest` and return the number of bytes written.
    ///
    /// The body goes to `<dest>.part` (e.g. `x.pdf.part`) first and is
    /// renamed on success, so a failed transfer never leaves a file at `dest`.
    /// A transfer cut short by killing the process leaves only the `.part`
    /// file, which the source scans ignore.
    #[instrument(level = "info", skip(self, dest), fields(dest = %dest.display()))]
    pub async fn download(&self, url: &str, dest: &Path, timeout: Duration) -> CorpusResult<u64> {
        let mut response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CorpusError::Status {
                url: url.to_string(),
                status,
            });
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        let part = partial_path(dest);
        let mut file = fs::File::create(&part).await?;
        let mut written = 0u64;

        let streamed: CorpusResult<()> = async {
            while let Some(chunk) = response.chunk().await? {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            Ok::<(), CorpusError>(())
        }
        .await;

        if let Err(e) = streamed {
            drop(file);
            let _ = fs::remove_file(&part).await;
            return Err(e);
        }

        drop(file);
        fs::rename(&part, dest).await?;
        info!(bytes = written, "Downloaded");
        Ok(written)
    }
}

/// Sleep between requests to stay polite toward the remote server.
pub async fn politeness_delay(ms: u64) {
    if ms > 0 {
        debug!(ms, "Pausing before next request");
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

/// Provenance and file details of a freshly downloaded source artifact.
pub fn describe_download(
    layout: &CorpusLayout,
    source_path: &Path,
    url: &str,
) -> CorpusResult<(SourceInfo, FileInfo)> {
    let (size, md5) = file_size_and_md5(source_path)?;
    let source_info = SourceInfo {
        url: Some(url.to_string()),
        downloaded_at: Some(now_iso()),
        archive_org_id: None,
    };
    let file_info = FileInfo {
        source_path: Some(layout.relative(source_path)),
        source_size_bytes: Some(size),
        source_md5: Some(md5),
        ..Default::default()
    };
    Ok((source_info, file_info))
}
