//! Synthetic summaries for bibliography items that cannot be fetched.
//!
//! The items live in `data/placeholders.yaml`, compiled into the binary. Each
//! one produces `extracted/<type>/<stem>.txt` with no matching source file,
//! which is what marks it as a placeholder in the manifest.

use crate::error::CorpusResult;
use crate::extract::write_text;
use crate::layout::CorpusLayout;
use crate::models::{
    ExtractionInfo, ExtractionMethod, ExtractionStatus, FileInfo, MetadataSidecar,
    PlaceholderCategory, ResourceType,
};
use crate::sidecar;
use crate::utils::{now_iso, word_count};
use serde::Deserialize;
use tracing::{error, info, instrument};

const PLACEHOLDERS_YAML: &str = include_str!("../data/placeholders.yaml");

/// One unobtainable item and the text that stands in for it.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceholderItem {
    pub id: String,
    pub resource_type: ResourceType,
    pub stem: String,
    pub title: String,
    pub year: i32,
    #[serde(default)]
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub isbn: Option<String>,
    pub doi: Option<String>,
    pub eric_id: Option<String>,
    pub category: PlaceholderCategory,
    pub reason: String,
    pub where_to_find: String,
    pub summary: String,
}

impl PlaceholderItem {
    /// Full placeholder text: header, bibliographic fields, summary, note.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&"=".repeat(self.title.chars().count()));
        out.push_str("\n\n");
        out.push_str(&format!("PLACEHOLDER SUMMARY - {}\n\n", self.reason));

        match self.authors.as_slice() {
            [] => {}
            [one] => out.push_str(&format!("Author: {one}\n")),
            many => out.push_str(&format!("Authors: {}\n", many.join(", "))),
        }
        out.push_str(&format!("Year: {}\n", self.year));
        let optional = [
            ("Publisher", &self.publisher),
            ("ISBN", &self.isbn),
            ("DOI", &self.doi),
            ("ERIC ID", &self.eric_id),
        ];
        for (label, value) in optional {
            if let Some(value) = value {
                out.push_str(&format!("{label}: {value}\n"));
            }
        }

        out.push('\n');
        out.push_str(self.summary.trim_end());
        out.push_str("\n\n");
        out.push_str(&format!(
            "NOTE: This is a placeholder summary; the full text was not obtainable when the corpus was built. {}\n",
            self.where_to_find
        ));
        out
    }

    fn sidecar(&self, layout: &CorpusLayout, words: usize) -> MetadataSidecar {
        MetadataSidecar {
            id: Some(self.id.clone()),
            title: Some(self.title.clone()),
            resource_type: Some(self.resource_type),
            year: Some(self.year),
            authors: self.authors.clone(),
            publisher: self.publisher.clone(),
            isbn: self.isbn.clone(),
            doi: self.doi.clone(),
            eric_id: self.eric_id.clone(),
            is_placeholder: true,
            placeholder_reason: Some(self.reason.clone()),
            placeholder_category: Some(self.category),
            file_info: Some(FileInfo {
                extracted_path: Some(
                    layout.relative(&layout.extracted_path(self.resource_type, &self.stem)),
                ),
                ..Default::default()
            }),
            extraction: Some(ExtractionInfo {
                status: ExtractionStatus::Placeholder,
                method: Some(ExtractionMethod::Synthetic),
                extracted_at: None,
                generated_at: Some(now_iso()),
                word_count: Some(words),
                page_count: None,
            }),
            ..Default::default()
        }
    }
}

/// The built-in placeholder list.
pub fn load_items() -> CorpusResult<Vec<PlaceholderItem>> {
    Ok(serde_yaml::from_str(PLACEHOLDERS_YAML)?)
}

/// Write the text and sidecar for one item; returns its word count.
pub fn write_placeholder(layout: &CorpusLayout, item: &PlaceholderItem) -> CorpusResult<usize> {
    let text = item.render();
    let words = word_count(&text);
    write_text(&layout.extracted_path(item.resource_type, &item.stem), &text)?;
    sidecar::save(
        &layout.metadata_path(item.resource_type, &item.stem),
        &item.sidecar(layout, words),
    )?;
    Ok(words)
}

/// Generate every placeholder. Returns `(created, total_words)`.
///
/// Items whose source was downloaded after all are left alone, so a real
/// text artifact is never replaced by a summary.
#[instrument(level = "info", skip_all)]
pub fn generate_all(layout: &CorpusLayout) -> CorpusResult<(usize, usize)> {
    let items = load_items()?;
    let mut created = 0;
    let mut total_words = 0;

    for item in &items {
        if layout.has_source(item.resource_type, &item.stem) {
            info!(id = %item.id, stem = %item.stem, "Source on disk; skipping placeholder");
            continue;
        }
        match write_placeholder(layout, item) {
            Ok(words) => {
                info!(id = %item.id, category = ?item.category, words, "Created placeholder");
                created += 1;
                total_words += words;
            }
            Err(e) => error!(id = %item.id, error = %e, "Could not write placeholder"),
        }
    }

    info!(created, total = items.len(), total_words, "Placeholders done");
    Ok((created, total_words))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CorpusConfig;
    use crate::models::DownloadStatus;
    use crate::outputs::manifest::build_manifest;
    use itertools::Itertools;

    #[test]
    fn test_builtin_items_parse() {
        let items = load_items().unwrap();
        assert_eq!(items.len(), 9);
        assert!(items.iter().map(|i| &i.id).all_unique());
        assert!(
            items
                .iter()
                .map(|i| (i.resource_type, &i.stem))
                .all_unique()
        );
        assert!(items.iter().all(|i| !i.summary.trim().is_empty()));
        assert!(
            items
                .iter()
                .any(|i| i.category == PlaceholderCategory::SelfPublished)
        );
    }

    #[test]
    fn test_render_layout() {
        let item = PlaceholderItem {
            id: "x".into(),
            resource_type: ResourceType::Books,
            stem: "2000-X".into(),
            title: "Short Title".into(),
            year: 2000,
            authors: vec!["A. Author".into(), "B. Author".into()],
            publisher: Some("Press".into()),
            isbn: Some("123".into()),
            doi: None,
            eric_id: None,
            category: PlaceholderCategory::OutOfPrint,
            reason: "Out of print".into(),
            where_to_find: "Try a library.".into(),
            summary: "One paragraph.\n".into(),
        };
        let text = item.render();
        assert!(text.starts_with(
            "Short Title\n===========\n\nPLACEHOLDER SUMMARY - Out of print\n\n\
             Authors: A. Author, B. Author\nYear: 2000\nPublisher: Press\nISBN: 123\n\n\
             One paragraph.\n\nNOTE: "
        ));
        assert!(text.ends_with("Try a library.\n"));
        assert!(!text.contains("DOI"));
    }

    #[test]
    fn test_generate_all_writes_text_and_sidecars() {
        let temp = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());

        let (created, total_words) = generate_all(&layout).unwrap();
        assert_eq!(created, 9);
        assert!(total_words > 0);

        let items = load_items().unwrap();
        let eric = items.iter().find(|i| i.eric_id.is_some()).unwrap();
        let meta = sidecar::load(&layout.metadata_path(eric.resource_type, &eric.stem)).unwrap();
        assert!(meta.is_placeholder);
        assert_eq!(meta.placeholder_category, Some(PlaceholderCategory::NotFound));
        assert_eq!(meta.eric_id, eric.eric_id);
        let extraction = meta.extraction.unwrap();
        assert_eq!(extraction.status, ExtractionStatus::Placeholder);
        assert_eq!(extraction.method, Some(ExtractionMethod::Synthetic));
        assert!(extraction.generated_at.is_some());

        let text =
            std::fs::read_to_string(layout.extracted_path(eric.resource_type, &eric.stem)).unwrap();
        assert_eq!(extraction.word_count, Some(word_count(&text)));
    }

    #[test]
    fn test_generated_placeholders_show_up_in_manifest() {
        let temp = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        let (_, total_words) = generate_all(&layout).unwrap();

        let manifest = build_manifest(&layout, &CorpusConfig::default(), now_iso());
        assert_eq!(manifest.items.len(), 9);
        assert!(manifest.items.iter().all(|i| i.is_placeholder
            && i.download_status == DownloadStatus::NotAvailable
            && i.extraction_status == ExtractionStatus::Placeholder));
        assert_eq!(manifest.statistics.items_placeholder, 9);
        assert_eq!(manifest.statistics.placeholder_word_count, total_words);
        assert_eq!(manifest.statistics.downloaded_word_count, 0);
    }

    #[test]
    fn test_downloaded_items_are_not_replaced() {
        let temp = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        let items = load_items().unwrap();
        let book = items
            .iter()
            .find(|i| i.category == PlaceholderCategory::LendingRestriction)
            .unwrap();

        let source = layout.source_path(book.resource_type, &format!("{}.pdf", book.stem));
        std::fs::create_dir_all(source.parent().unwrap()).unwrap();
        std::fs::write(&source, b"%PDF-1.4").unwrap();
        let text_path = layout.extracted_path(book.resource_type, &book.stem);
        write_text(&text_path, "[Page 1]\nreal text\n").unwrap();

        let (created, _) = generate_all(&layout).unwrap();
        assert_eq!(created, 8);
        assert_eq!(
            std::fs::read_to_string(&text_path).unwrap(),
            "[Page 1]\nreal text\n"
        );
        assert!(!layout.metadata_path(book.resource_type, &book.stem).exists());
    }

    #[test]
    fn test_regeneration_is_stable() {
        let temp = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        let first = generate_all(&layout).unwrap();
        let second = generate_all(&layout).unwrap();
        assert_eq!(first, second);
    }
}
