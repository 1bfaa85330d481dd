//! Data models for corpus items, metadata sidecars, and the aggregate manifest.
//!
//! This module defines the core data structures used throughout the application:
//! - [`ResourceType`]: The fixed enumeration of resource-type directories
//! - [`MetadataSidecar`]: The per-item JSON record stored under `metadata/<type>/`
//! - [`Manifest`]: The single aggregate JSON describing the whole corpus
//! - [`ManifestItem`] and [`Statistics`]: Per-item rows and their totals
//!
//! Sidecars are amended by several subcommands over the life of the corpus, so
//! every field is optional and unknown fields are carried through untouched.
//! Known fields are read leniently: a value of the wrong shape (an older
//! `"resource_type": "book"`, a string year) reads as absent instead of
//! discarding the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::utils::truncate_for_log;

/// Longest error message kept in a download report entry.
const MAX_ERROR_BYTES: usize = 300;

/// Read an optional sidecar field; a value that does not fit `T` is `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Like [`lenient`], falling back to `T::default()`.
fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// The kind of bibliography entry an item belongs to.
///
/// Each variant names a directory under `sources/`, `extracted/`, and
/// `metadata/`. The declaration order is the scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    EricDocs,
    Books,
    JournalArticles,
    BlogPosts,
    PolicyDocs,
    Reference,
    Plays,
}

impl ResourceType {
    /// Every resource type, in scan order.
    pub const ALL: [ResourceType; 7] = [
        ResourceType::EricDocs,
        ResourceType::Books,
        ResourceType::JournalArticles,
        ResourceType::BlogPosts,
        ResourceType::PolicyDocs,
        ResourceType::Reference,
        ResourceType::Plays,
    ];

    /// The directory name used on disk and in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::EricDocs => "eric_docs",
            ResourceType::Books => "books",
            ResourceType::JournalArticles => "journal_articles",
            ResourceType::BlogPosts => "blog_posts",
            ResourceType::PolicyDocs => "policy_docs",
            ResourceType::Reference => "reference",
            ResourceType::Plays => "plays",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown resource type: {s}"))
    }
}

/// Progress of text extraction for one item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    #[default]
    Pending,
    Completed,
    Placeholder,
}

/// How an extracted-text artifact was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    ParsedFromPdf,
    ParsedFromHtml,
    Synthetic,
}

/// Why no source artifact could be obtained for a placeholder item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderCategory {
    /// The remote server answered 404.
    NotFound,
    /// Archive.org only lends the item.
    LendingRestriction,
    /// Publisher subscription required.
    Paywall,
    /// In print and sold commercially.
    Commercial,
    OutOfPrint,
    SelfPublished,
}

/// Where a source artifact was fetched from.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SourceInfo {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub downloaded_at: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub archive_org_id: Option<String>,
}

/// Paths, size, and checksum of the files backing an item.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FileInfo {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub source_size_bytes: Option<u64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub source_md5: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub extracted_path: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub html_path: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub txt_path: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
}

/// Extraction record embedded in a sidecar.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExtractionInfo {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub status: ExtractionStatus,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub method: Option<ExtractionMethod>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub extracted_at: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
}

impl ExtractionInfo {
    /// A fresh record for a source whose text has not been extracted yet.
    pub fn pending() -> Self {
        Self {
            status: ExtractionStatus::Pending,
            method: None,
            extracted_at: None,
            generated_at: None,
            word_count: None,
            page_count: None,
        }
    }
}

/// JSON sidecar describing one corpus item.
///
/// Stored at `metadata/<type>/<stem>.json`. Fields this crate does not know
/// about are kept in `extra` so that amending a sidecar never drops data.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MetadataSidecar {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<ResourceType>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(
        default,
        deserialize_with = "lenient_or_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub authors: Vec<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub eric_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub is_placeholder: bool,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub placeholder_reason: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub placeholder_category: Option<PlaceholderCategory>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub source_info: Option<SourceInfo>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub file_info: Option<FileInfo>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub extraction: Option<ExtractionInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Whether a source artifact exists for a manifest item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    Downloaded,
    NotAvailable,
}

/// One row of the manifest.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ManifestItem {
    pub resource_type: ResourceType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    pub download_status: DownloadStatus,
    pub extraction_status: ExtractionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_path: Option<String>,
    pub word_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_path: Option<String>,
    pub is_placeholder: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder_reason: Option<String>,
}

impl ManifestItem {
    /// Secondary sort key: the source filename, or the title for placeholders.
    pub fn sort_name(&self) -> &str {
        self.source_file.as_deref().unwrap_or(&self.title)
    }
}

/// Per-resource-type totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TypeStatistics {
    pub count: usize,
    pub downloaded: usize,
    pub extracted: usize,
    pub placeholders: usize,
    pub word_count: usize,
}

/// Corpus-wide totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Statistics {
    pub total_items_in_bibliography: usize,
    pub total_items: usize,
    pub items_downloaded: usize,
    pub items_extracted: usize,
    pub items_placeholder: usize,
    pub total_word_count: usize,
    pub downloaded_word_count: usize,
    pub placeholder_word_count: usize,
    pub by_type: BTreeMap<ResourceType, TypeStatistics>,
}

/// The aggregate manifest written at the corpus root.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Manifest {
    pub version: String,
    pub corpus_name: String,
    pub description: String,
    pub source_bibliography: String,
    pub generated_at: String,
    pub statistics: Statistics,
    pub items: Vec<ManifestItem>,
}

/// Result of trying to fetch one catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Downloaded,
    Failed,
}

/// One line of the download report.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FetchOutcome {
    pub id: String,
    pub title: String,
    pub status: FetchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn downloaded(id: &str, title: &str, path: String, words: Option<usize>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            status: FetchStatus::Downloaded,
            path: Some(path),
            words,
            error: None,
        }
    }

    pub fn failed(id: &str, title: &str, error: impl ToString) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            status: FetchStatus::Failed,
            path: None,
            words: None,
            error: Some(truncate_for_log(&error.to_string(), MAX_ERROR_BYTES)),
        }
    }

    pub fn is_downloaded(&self) -> bool {
        self.status == FetchStatus::Downloaded
    }
}

/// Report of a `fetch` run, written to `download_results.json`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DownloadResults {
    pub started_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    pub eric_docs: Vec<FetchOutcome>,
    pub archive_books: Vec<FetchOutcome>,
    pub blog_posts: Vec<FetchOutcome>,
}
