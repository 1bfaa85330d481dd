//! Manifest generation: reconcile sources, extracted text, and sidecars.
//!
//! For every resource type the generator joins three directories by filename
//! stem:
//!
//! ```text
//! sources/<type>/<stem>.<ext>   ->  item, "downloaded"
//! extracted/<type>/<stem>.txt   ->  word count; without a source: placeholder
//! metadata/<type>/<stem>.json   ->  title, id, year, placeholder reason
//! ```
//!
//! The scan is read-only. Output order is `(resource type, file name or
//! title)`, so two runs over an unchanged tree differ only in `generated_at`.

use crate::config::CorpusConfig;
use crate::layout::{CorpusLayout, TEXT_EXTENSION, file_stem, is_partial};
use crate::models::{
    DownloadStatus, ExtractionStatus, Manifest, ManifestItem, MetadataSidecar, ResourceType,
    Statistics,
};
use crate::sidecar;
use crate::utils::{to_pretty_json, word_count_in_file};
use std::collections::HashSet;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

pub const MANIFEST_VERSION: &str = "1.0";

/// Reason recorded for a placeholder whose sidecar does not give one.
pub const UNKNOWN_PLACEHOLDER_REASON: &str = "Source not available";

/// Regular files directly under `dir`, sorted by name, leaving out
/// unfinished downloads.
///
/// A missing directory yields no files.
fn list_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && !is_partial(p))
        .collect();
    files.sort();
    files
}

fn has_text_extension(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == TEXT_EXTENSION)
}

/// Look up the sidecar for a stem, returning it along with its relative path.
fn lookup_sidecar(
    layout: &CorpusLayout,
    resource_type: ResourceType,
    stem: &str,
) -> (Option<MetadataSidecar>, Option<String>) {
    let path = layout.metadata_path(resource_type, stem);
    match sidecar::load(&path) {
        Some(meta) => (Some(meta), Some(layout.relative(&path))),
        None => (None, None),
    }
}

/// Items backed by a file under `sources/<type>/`.
fn scan_sources(
    layout: &CorpusLayout,
    resource_type: ResourceType,
    seen: &mut HashSet<String>,
) -> Vec<ManifestItem> {
    let mut items = Vec::new();

    for source in list_files(&layout.sources_dir(resource_type)) {
        let stem = file_stem(&source);
        let source_file = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let text_path = layout.extracted_path(resource_type, &stem);
        let (extraction_status, extracted_path, word_count) = if text_path.is_file() {
            (
                ExtractionStatus::Completed,
                Some(layout.relative(&text_path)),
                word_count_in_file(&text_path),
            )
        } else {
            (ExtractionStatus::Pending, None, 0)
        };

        let (meta, metadata_path) = lookup_sidecar(layout, resource_type, &stem);
        let meta = meta.unwrap_or_default();

        items.push(ManifestItem {
            resource_type,
            title: meta.title.unwrap_or_else(|| stem.clone()),
            id: meta.id,
            year: meta.year,
            source_file: Some(source_file),
            source_path: Some(layout.relative(&source)),
            download_status: DownloadStatus::Downloaded,
            extraction_status,
            extracted_path,
            word_count,
            metadata_path,
            is_placeholder: false,
            placeholder_reason: None,
        });
        seen.insert(stem);
    }

    items
}

/// Extracted-text files with no same-stem source: placeholder items.
fn scan_placeholders(
    layout: &CorpusLayout,
    resource_type: ResourceType,
    seen: &HashSet<String>,
) -> Vec<ManifestItem> {
    list_files(&layout.extracted_dir(resource_type))
        .into_iter()
        .filter(|p| has_text_extension(p))
        .filter(|p| !seen.contains(&file_stem(p)))
        .map(|text_path| {
            let stem = file_stem(&text_path);
            let (meta, metadata_path) = lookup_sidecar(layout, resource_type, &stem);
            let meta = meta.unwrap_or_default();

            ManifestItem {
                resource_type,
                title: meta.title.unwrap_or_else(|| stem.clone()),
                id: meta.id,
                year: meta.year,
                source_file: None,
                source_path: None,
                download_status: DownloadStatus::NotAvailable,
                extraction_status: ExtractionStatus::Placeholder,
                extracted_path: Some(layout.relative(&text_path)),
                word_count: word_count_in_file(&text_path),
                metadata_path,
                is_placeholder: true,
                placeholder_reason: Some(
                    meta.placeholder_reason
                        .unwrap_or_else(|| UNKNOWN_PLACEHOLDER_REASON.to_string()),
                ),
            }
        })
        .collect()
}

/// Aggregate counts over `items`. Types with no items are left out of `by_type`.
pub fn compute_statistics(items: &[ManifestItem], bibliography_size: usize) -> Statistics {
    let mut stats = Statistics {
        total_items_in_bibliography: bibliography_size,
        total_items: items.len(),
        ..Default::default()
    };

    for item in items {
        let per_type = stats.by_type.entry(item.resource_type).or_default();
        per_type.count += 1;
        per_type.word_count += item.word_count;
        stats.total_word_count += item.word_count;

        if item.is_placeholder {
            per_type.placeholders += 1;
            stats.items_placeholder += 1;
            stats.placeholder_word_count += item.word_count;
        } else {
            per_type.downloaded += 1;
            stats.items_downloaded += 1;
            stats.downloaded_word_count += item.word_count;
            if item.extraction_status == ExtractionStatus::Completed {
                per_type.extracted += 1;
                stats.items_extracted += 1;
            }
        }
    }

    stats
}

/// Scan the corpus tree and build the manifest.
#[instrument(level = "info", skip_all, fields(root = %layout.root().display()))]
pub fn build_manifest(
    layout: &CorpusLayout,
    config: &CorpusConfig,
    generated_at: String,
) -> Manifest {
    let mut items = Vec::new();

    for resource_type in ResourceType::ALL {
        let mut seen = HashSet::new();
        let downloaded = scan_sources(layout, resource_type, &mut seen);
        let placeholders = scan_placeholders(layout, resource_type, &seen);
        debug!(
            %resource_type,
            downloaded = downloaded.len(),
            placeholders = placeholders.len(),
            "Scanned resource type"
        );
        items.extend(downloaded);
        items.extend(placeholders);
    }

    items.sort_by(|a, b| {
        (a.resource_type.as_str(), a.sort_name(), &a.extracted_path)
            .cmp(&(b.resource_type.as_str(), b.sort_name(), &b.extracted_path))
    });

    let statistics = compute_statistics(&items, config.bibliography_size);

    Manifest {
        version: MANIFEST_VERSION.to_string(),
        corpus_name: config.corpus_name.clone(),
        description: config.description.clone(),
        source_bibliography: config.source_bibliography.clone(),
        generated_at,
        statistics,
        items,
    }
}

/// Write the manifest to `<root>/<manifest_file>` and return the path.
#[instrument(level = "info", skip_all)]
pub async fn write_manifest(
    manifest: &Manifest,
    layout: &CorpusLayout,
    config: &CorpusConfig,
) -> Result<PathBuf, Box<dyn Error>> {
    let path = layout.root().join(&config.manifest_file);
    fs::write(&path, to_pretty_json(manifest)?).await?;
    info!(path = %path.display(), "Wrote manifest");
    Ok(path)
}

/// Log the headline numbers of a manifest.
pub fn log_summary(manifest: &Manifest) {
    let stats = &manifest.statistics;
    info!(
        total_items = stats.total_items,
        items_downloaded = stats.items_downloaded,
        items_extracted = stats.items_extracted,
        items_placeholder = stats.items_placeholder,
        total_word_count = stats.total_word_count,
        downloaded_word_count = stats.downloaded_word_count,
        placeholder_word_count = stats.placeholder_word_count,
        "Manifest statistics"
    );
    for (resource_type, t) in &stats.by_type {
        info!(
            %resource_type,
            count = t.count,
            downloaded = t.downloaded,
            extracted = t.extracted,
            placeholders = t.placeholders,
            word_count = t.word_count,
            "By type"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::word_count;
    use tempfile::tempdir;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    fn write(path: PathBuf, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn build(layout: &CorpusLayout) -> Manifest {
        build_manifest(layout, &CorpusConfig::default(), "2026-01-01T00:00:00+00:00".into())
    }

    #[test]
    fn test_downloaded_item_with_text_and_title() {
        let temp = tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        let t = ResourceType::EricDocs;
        write(layout.source_path(t, "x.pdf"), "%PDF-1.4");
        write(layout.extracted_path(t, "x"), &words(100));
        write(layout.metadata_path(t, "x"), r#"{"title": "Foo", "year": 1973}"#);

        let manifest = build(&layout);
        assert_eq!(manifest.items.len(), 1);
        let item = &manifest.items[0];
        assert_eq!(item.title, "Foo");
        assert_eq!(item.year, Some(1973));
        assert_eq!(item.extraction_status, ExtractionStatus::Completed);
        assert_eq!(item.download_status, DownloadStatus::Downloaded);
        assert_eq!(item.word_count, 100);
        assert_eq!(item.source_file.as_deref(), Some("x.pdf"));
        assert_eq!(item.source_path.as_deref(), Some("sources/eric_docs/x.pdf"));
        assert_eq!(item.extracted_path.as_deref(), Some("extracted/eric_docs/x.txt"));
        assert_eq!(item.metadata_path.as_deref(), Some("metadata/eric_docs/x.json"));
        assert!(!item.is_placeholder);
    }

    #[test]
    fn test_text_without_source_is_placeholder() {
        let temp = tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        write(layout.extracted_path(ResourceType::Books, "y"), &words(50));

        let manifest = build(&layout);
        assert_eq!(manifest.items.len(), 1);
        let item = &manifest.items[0];
        assert!(item.is_placeholder);
        assert_eq!(item.word_count, 50);
        assert_eq!(item.download_status, DownloadStatus::NotAvailable);
        assert_eq!(item.extraction_status, ExtractionStatus::Placeholder);
        assert_eq!(item.title, "y");
        assert_eq!(item.placeholder_reason.as_deref(), Some(UNKNOWN_PLACEHOLDER_REASON));
        assert!(item.source_path.is_none());
    }

    #[test]
    fn test_placeholder_reason_comes_from_sidecar() {
        let temp = tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        let t = ResourceType::Plays;
        write(layout.extracted_path(t, "alana"), "a short summary");
        write(
            layout.metadata_path(t, "alana"),
            r#"{"title": "A Conversation with Alana", "is_placeholder": true,
                "placeholder_reason": "Self-published - purchase required"}"#,
        );

        let manifest = build(&layout);
        let item = &manifest.items[0];
        assert_eq!(item.title, "A Conversation with Alana");
        assert_eq!(
            item.placeholder_reason.as_deref(),
            Some("Self-published - purchase required")
        );
    }

    #[test]
    fn test_source_without_text_is_pending() {
        let temp = tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        write(layout.source_path(ResourceType::Books, "book.pdf"), "%PDF");

        let manifest = build(&layout);
        let item = &manifest.items[0];
        assert_eq!(item.extraction_status, ExtractionStatus::Pending);
        assert_eq!(item.word_count, 0);
        assert!(item.extracted_path.is_none());
        assert_eq!(item.title, "book");
        assert_eq!(manifest.statistics.items_downloaded, 1);
        assert_eq!(manifest.statistics.items_extracted, 0);
    }

    #[test]
    fn test_malformed_sidecar_falls_back_to_stem() {
        let temp = tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        let t = ResourceType::BlogPosts;
        write(layout.source_path(t, "post.html"), "<html></html>");
        write(layout.metadata_path(t, "post"), "{not json");

        let manifest = build(&layout);
        let item = &manifest.items[0];
        assert_eq!(item.title, "post");
        assert!(item.metadata_path.is_none());
    }

    #[test]
    fn test_sidecars_with_older_values_still_supply_titles() {
        let temp = tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        write(layout.source_path(ResourceType::EricDocs, "x.pdf"), "%PDF");
        write(
            layout.metadata_path(ResourceType::EricDocs, "x"),
            r#"{"title": "Foo", "id": "ed1", "year": 1973, "resource_type": "eric_document",
                "extraction": {"status": "pending", "method": "pypdf"}}"#,
        );
        write(layout.extracted_path(ResourceType::Plays, "alana"), "summary text");
        write(
            layout.metadata_path(ResourceType::Plays, "alana"),
            r#"{"title": "A Conversation with Alana", "is_placeholder": true,
                "placeholder_reason": "Self-published",
                "extraction": {"status": "placeholder", "method": "ai_generated_summary"}}"#,
        );

        let manifest = build(&layout);
        let doc = &manifest.items[0];
        assert_eq!(doc.title, "Foo");
        assert_eq!(doc.id.as_deref(), Some("ed1"));
        assert_eq!(doc.year, Some(1973));
        assert_eq!(doc.metadata_path.as_deref(), Some("metadata/eric_docs/x.json"));

        let play = &manifest.items[1];
        assert_eq!(play.title, "A Conversation with Alana");
        assert_eq!(play.placeholder_reason.as_deref(), Some("Self-published"));
        assert_eq!(play.metadata_path.as_deref(), Some("metadata/plays/alana.json"));
    }

    #[test]
    fn test_missing_and_empty_directories_contribute_nothing() {
        let temp = tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        std::fs::create_dir_all(layout.sources_dir(ResourceType::PolicyDocs)).unwrap();
        write(layout.extracted_path(ResourceType::Books, "b"), "two words");

        let manifest = build(&layout);
        assert_eq!(manifest.items.len(), 1);
        assert!(!manifest.statistics.by_type.contains_key(&ResourceType::PolicyDocs));
        assert!(!manifest.statistics.by_type.contains_key(&ResourceType::EricDocs));
        assert!(manifest.statistics.by_type.contains_key(&ResourceType::Books));
    }

    #[test]
    fn test_interrupted_download_adds_no_item() {
        let temp = tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        let t = ResourceType::EricDocs;
        let dest = layout.source_path(t, "1973-Cortes-ED079204.pdf");
        write(dest.clone(), "%PDF-1.4");
        write(crate::layout::partial_path(&dest), "%PDF-1.4 cut off");

        let manifest = build(&layout);
        assert_eq!(manifest.items.len(), 1);
        assert_eq!(
            manifest.items[0].source_file.as_deref(),
            Some("1973-Cortes-ED079204.pdf")
        );
    }

    #[test]
    fn test_non_text_files_in_extracted_are_ignored() {
        let temp = tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        write(
            layout.extracted_dir(ResourceType::Books).join("notes.md"),
            "ignored",
        );
        assert!(build(&layout).items.is_empty());
    }

    #[test]
    fn test_statistics_split_downloaded_and_placeholder_words() {
        let temp = tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        let t = ResourceType::Books;
        write(layout.source_path(t, "a.pdf"), "%PDF");
        write(layout.extracted_path(t, "a"), &words(30));
        write(layout.source_path(t, "b.pdf"), "%PDF");
        write(layout.extracted_path(t, "c"), &words(7));
        write(layout.extracted_path(ResourceType::Reference, "enc"), &words(11));

        let manifest = build(&layout);
        let stats = &manifest.statistics;
        assert_eq!(stats.total_items, 4);
        assert_eq!(stats.items_downloaded, 2);
        assert_eq!(stats.items_extracted, 1);
        assert_eq!(stats.items_placeholder, 2);
        assert_eq!(stats.downloaded_word_count, 30);
        assert_eq!(stats.placeholder_word_count, 18);
        assert_eq!(stats.total_word_count, 48);
        assert_eq!(stats.total_items_in_bibliography, 63);

        let books = &stats.by_type[&ResourceType::Books];
        assert_eq!(books.count, 3);
        assert_eq!(books.downloaded, 2);
        assert_eq!(books.extracted, 1);
        assert_eq!(books.placeholders, 1);
        assert_eq!(books.word_count, 37);

        for (resource_type, per_type) in &stats.by_type {
            let sum: usize = manifest
                .items
                .iter()
                .filter(|i| i.resource_type == *resource_type)
                .map(|i| i.word_count)
                .sum();
            assert_eq!(per_type.word_count, sum);
        }
    }

    #[test]
    fn test_items_are_sorted_by_type_then_name() {
        let temp = tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        write(layout.source_path(ResourceType::EricDocs, "b.pdf"), "%PDF");
        write(layout.source_path(ResourceType::EricDocs, "a.pdf"), "%PDF");
        write(layout.source_path(ResourceType::BlogPosts, "z.html"), "<p>");
        write(layout.extracted_path(ResourceType::Books, "m"), "m");

        let manifest = build(&layout);
        let keys: Vec<(&str, &str)> = manifest
            .items
            .iter()
            .map(|i| (i.resource_type.as_str(), i.sort_name()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("blog_posts", "z.html"),
                ("books", "m"),
                ("eric_docs", "a.pdf"),
                ("eric_docs", "b.pdf"),
            ]
        );
    }

    #[test]
    fn test_completed_word_counts_match_files() {
        let temp = tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        let t = ResourceType::JournalArticles;
        write(layout.source_path(t, "art.pdf"), "%PDF");
        write(layout.extracted_path(t, "art"), "[Page 1]\nSome   text\n\nmore\ttext here\n");

        let manifest = build(&layout);
        for item in manifest
            .items
            .iter()
            .filter(|i| i.extraction_status == ExtractionStatus::Completed)
        {
            let path = temp.path().join(item.extracted_path.as_ref().unwrap());
            let text = std::fs::read_to_string(path).unwrap();
            assert_eq!(item.word_count, word_count(&text));
        }
        assert_eq!(manifest.items[0].word_count, 7);
    }

    #[test]
    fn test_repeated_builds_are_identical() {
        let temp = tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        write(layout.source_path(ResourceType::Books, "a.pdf"), "%PDF");
        write(layout.extracted_path(ResourceType::Books, "a"), &words(3));
        write(layout.extracted_path(ResourceType::Plays, "p"), &words(4));

        let first = to_pretty_json(&build(&layout)).unwrap();
        let second = to_pretty_json(&build(&layout)).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_write_manifest_to_root() {
        let temp = tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        let config = CorpusConfig::default();
        write(layout.extracted_path(ResourceType::Books, "y"), &words(5));

        let manifest = build_manifest(&layout, &config, "now".into());
        let path = write_manifest(&manifest, &layout, &config).await.unwrap();
        assert_eq!(path, temp.path().join("manifest.json"));

        let raw = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["items"][0]["download_status"], "not_available");
        assert_eq!(value["items"][0]["is_placeholder"], true);
        assert_eq!(value["statistics"]["by_type"]["books"]["word_count"], 5);
    }
}
