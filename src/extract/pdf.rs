//! PDF text extraction.
//!
//! Walks `sources/<type>/*.pdf` for every resource type and writes one text
//! artifact per document:
//!
//! ```text
//! [Page 1]
//! <text of page 1>
//!
//! [Page 2]
//! ...
//! ```
//!
//! Pages whose text cannot be decoded, or that come out empty, are left out.
//! A document `lopdf` cannot open at all is a per-document failure.

use super::write_text;
use crate::error::{CorpusError, CorpusResult};
use crate::layout::{CorpusLayout, file_stem};
use crate::models::{ExtractionInfo, ExtractionMethod, ExtractionStatus, FileInfo, ResourceType};
use crate::sidecar;
use crate::utils::{now_iso, word_count};
use lopdf::Document;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

/// Text of one document, after unreadable pages were dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfText {
    pub text: String,
    /// Pages in the document, readable or not.
    pub page_count: usize,
    /// Pages that contributed text.
    pub pages_with_text: usize,
}

/// Join `(page number, text)` pairs into the `[Page N]` layout.
///
/// Blank pages are skipped. Returns the text and the number of pages kept.
pub fn assemble_pages(pages: impl IntoIterator<Item = (u32, String)>) -> (String, usize) {
    let mut parts = Vec::new();
    let mut kept = 0;
    for (number, text) in pages {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        parts.push(format!("[Page {number}]\n{text}\n"));
        kept += 1;
    }
    (parts.join("\n"), kept)
}

/// Parse `bytes` as a PDF and pull the text out of each page.
pub fn extract_pdf_text(bytes: &[u8]) -> CorpusResult<PdfText> {
    let document = Document::load_mem(bytes).map_err(|e| CorpusError::Pdf(e.to_string()))?;
    let pages = document.get_pages();
    let page_count = pages.len();

    let texts = pages.keys().filter_map(|&number| {
        match document.extract_text(&[number]) {
            Ok(text) => Some((number, text)),
            Err(e) => {
                debug!(page = number, error = %e, "Skipping unreadable page");
                None
            }
        }
    });
    let (text, pages_with_text) = assemble_pages(texts);

    Ok(PdfText {
        text,
        page_count,
        pages_with_text,
    })
}

/// Every PDF under `sources/<type>/`, in type order then name order.
fn find_pdfs(layout: &CorpusLayout) -> Vec<(ResourceType, PathBuf)> {
    let mut found = Vec::new();
    for resource_type in ResourceType::ALL {
        let Ok(entries) = std::fs::read_dir(layout.sources_dir(resource_type)) else {
            continue;
        };
        let mut pdfs: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
            })
            .collect();
        pdfs.sort();
        found.extend(pdfs.into_iter().map(|p| (resource_type, p)));
    }
    found
}

/// Amend (or create) the sidecar of an extracted PDF.
fn record_extraction(
    layout: &CorpusLayout,
    resource_type: ResourceType,
    stem: &str,
    pdf: &PdfText,
    words: usize,
) -> CorpusResult<()> {
    let extracted_path = layout.relative(&layout.extracted_path(resource_type, stem));
    sidecar::amend(&layout.metadata_path(resource_type, stem), |meta| {
        meta.resource_type.get_or_insert(resource_type);
        meta.file_info
            .get_or_insert_with(FileInfo::default)
            .extracted_path = Some(extracted_path);
        meta.extraction = Some(ExtractionInfo {
            status: ExtractionStatus::Completed,
            method: Some(ExtractionMethod::ParsedFromPdf),
            extracted_at: Some(now_iso()),
            generated_at: None,
            word_count: Some(words),
            page_count: Some(pdf.page_count),
        });
    })
}

#[instrument(level = "info", skip_all, fields(path = %path.display()))]
async fn extract_document(
    layout: &CorpusLayout,
    resource_type: ResourceType,
    path: &Path,
) -> CorpusResult<usize> {
    let bytes = tokio::fs::read(path).await?;
    let pdf = tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
        .await
        .map_err(|e| CorpusError::Pdf(e.to_string()))??;

    if pdf.pages_with_text < pdf.page_count {
        warn!(
            pages = pdf.page_count,
            with_text = pdf.pages_with_text,
            "Some pages produced no text"
        );
    }

    let stem = file_stem(path);
    write_text(&layout.extracted_path(resource_type, &stem), &pdf.text)?;
    let words = word_count(&pdf.text);
    if let Err(e) = record_extraction(layout, resource_type, &stem, &pdf, words) {
        warn!(error = %e, "Text written but sidecar left as it was");
    }

    info!(pages = pdf.page_count, words, "Extracted");
    Ok(words)
}

/// Extract every downloaded PDF. Returns `(extracted, failed)` counts.
#[instrument(level = "info", skip_all)]
pub async fn extract_all(layout: &CorpusLayout) -> (usize, usize) {
    let pdfs = find_pdfs(layout);
    if pdfs.is_empty() {
        info!("No PDFs to extract");
        return (0, 0);
    }

    let mut extracted = 0;
    let mut failed = 0;
    let mut total_words = 0;
    for (resource_type, path) in &pdfs {
        match extract_document(layout, *resource_type, path).await {
            Ok(words) => {
                extracted += 1;
                total_words += words;
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "PDF extraction failed");
                failed += 1;
            }
        }
    }

    info!(extracted, failed, total_words, "PDF extraction done");
    (extracted, failed)
}
