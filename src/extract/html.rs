//! Blog post content extraction.
//!
//! Linearizes a saved blog page into plain text:
//!
//! ```text
//! <title from first h1>
//! =====================
//!
//! <paragraph>
//!
//! <heading>
//!
//! ...
//! ```
//!
//! `script`, `style`, `nav`, `header`, `footer`, and `aside` subtrees are
//! ignored everywhere. The content container is the first `article`, `main`,
//! `.post-content`, or `.entry-content` found, in that order of preference.
//! Pages without one fall back to every remaining text node, one per line.

use super::write_text;
use crate::catalog::BLOG_RESOURCE;
use crate::error::CorpusResult;
use crate::layout::{CorpusLayout, file_stem};
use crate::models::{ExtractionInfo, ExtractionMethod, ExtractionStatus, FileInfo};
use crate::sidecar;
use crate::utils::{now_iso, word_count};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};

/// Elements whose text never reaches the output.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "header", "footer", "aside"];

/// Blocks shorter than this (in characters) are dropped as fragments.
const MIN_BLOCK_CHARS: usize = 10;

pub const UNKNOWN_TITLE: &str = "Unknown";

static CONTAINER_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["article", "main", ".post-content", ".entry-content"]
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
});

static H1_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());

static BLOCK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p, h2, h3, h4, blockquote, li").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Text pulled out of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub text: String,
    /// `false` when no content container was found and the fallback was used.
    pub used_container: bool,
}

fn is_skipped(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()))
}

/// Whether `element` or any ancestor is a skipped element.
fn in_skipped_subtree(element: &ElementRef<'_>) -> bool {
    SKIPPED_ELEMENTS.contains(&element.value().name())
        || element.ancestors().any(|a| is_skipped(a.value()))
}

/// Text of `element` outside skipped subtrees, whitespace-collapsed.
fn visible_text(element: &ElementRef<'_>) -> String {
    let raw: Vec<&str> = element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .ancestors()
                .take_while(|a| a.id() != element.id())
                .any(|a| is_skipped(a.value()));
            (!hidden).then_some(&**text)
        })
        .collect();
    WHITESPACE
        .replace_all(&raw.join(" "), " ")
        .trim()
        .to_string()
}

fn find_container(document: &Html) -> Option<ElementRef<'_>> {
    CONTAINER_SELECTORS.iter().find_map(|selector| {
        document
            .select(selector)
            .find(|el| !in_skipped_subtree(el))
    })
}

fn find_title(document: &Html) -> String {
    document
        .select(&H1_SELECTOR)
        .filter(|el| !in_skipped_subtree(el))
        .map(|el| visible_text(&el))
        .find(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
}

/// Every text node outside skipped subtrees, trimmed, one per line.
fn fallback_text(document: &Html) -> String {
    document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            if node.ancestors().any(|a| is_skipped(a.value())) {
                return None;
            }
            let trimmed = text.trim();
            (!trimmed.is_empty()).then_some(trimmed)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Linearize a blog page into plain text.
pub fn extract_blog_text(html: &str) -> ExtractedPage {
    let document = Html::parse_document(html);

    let Some(container) = find_container(&document) else {
        return ExtractedPage {
            text: fallback_text(&document),
            used_container: false,
        };
    };

    let title = find_title(&document);
    let underline = "=".repeat(title.chars().count());
    let mut lines = vec![title, underline, String::new()];

    for block in container.select(&BLOCK_SELECTOR) {
        if in_skipped_subtree(&block) {
            continue;
        }
        let text = visible_text(&block);
        if text.chars().count() > MIN_BLOCK_CHARS {
            lines.push(text);
            lines.push(String::new());
        }
    }

    ExtractedPage {
        text: lines.join("\n"),
        used_container: true,
    }
}

/// Extract `html` into `extracted/blog_posts/<stem>.txt`; returns the word count.
pub fn extract_to_file(layout: &CorpusLayout, stem: &str, html: &str) -> CorpusResult<usize> {
    let page = extract_blog_text(html);
    if !page.used_container {
        warn!(%stem, "No content container; fell back to whole-page text");
    }
    write_text(&layout.extracted_path(BLOG_RESOURCE, stem), &page.text)?;
    Ok(word_count(&page.text))
}

/// Amend a blog sidecar after extraction.
pub fn record_extraction(
    layout: &CorpusLayout,
    stem: &str,
    html_path: &Path,
    words: usize,
) -> CorpusResult<()> {
    let html_path = layout.relative(html_path);
    let text_path = layout.relative(&layout.extracted_path(BLOG_RESOURCE, stem));

    sidecar::amend(&layout.metadata_path(BLOG_RESOURCE, stem), |meta| {
        let file_info = meta.file_info.get_or_insert_with(FileInfo::default);
        file_info.html_path = Some(html_path);
        file_info.txt_path = Some(text_path);
        file_info.word_count = Some(words);

        meta.resource_type.get_or_insert(BLOG_RESOURCE);
        meta.extraction = Some(ExtractionInfo {
            status: ExtractionStatus::Completed,
            method: Some(ExtractionMethod::ParsedFromHtml),
            extracted_at: Some(now_iso()),
            generated_at: None,
            word_count: Some(words),
            page_count: None,
        });
    })
}

async fn extract_saved_page(layout: &CorpusLayout, stem: &str, path: &Path) -> CorpusResult<usize> {
    let bytes = tokio::fs::read(path).await?;
    let html = String::from_utf8_lossy(&bytes);
    let words = extract_to_file(layout, stem, &html)?;
    if let Err(e) = record_extraction(layout, stem, path, words) {
        warn!(%stem, error = %e, "Text written but sidecar left as it was");
    }
    Ok(words)
}

/// Re-extract every saved blog page under `sources/blog_posts/`.
///
/// Returns `(extracted, failed)` counts.
#[instrument(level = "info", skip_all)]
pub async fn extract_saved_pages(layout: &CorpusLayout) -> (usize, usize) {
    let dir = layout.sources_dir(BLOG_RESOURCE);
    let mut pages: Vec<_> = match std::fs::read_dir(&dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|e| e == "html"))
            .collect(),
        Err(_) => {
            info!(dir = %dir.display(), "No saved blog pages");
            return (0, 0);
        }
    };
    pages.sort();

    let mut extracted = 0;
    let mut failed = 0;
    for path in pages {
        let stem = file_stem(&path);
        match extract_saved_page(layout, &stem, &path).await {
            Ok(words) => {
                debug!(%stem, words, "Extracted blog page");
                extracted += 1;
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Blog extraction failed");
                failed += 1;
            }
        }
    }

    info!(extracted, failed, "Blog extraction done");
    (extracted, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResourceType;

    const POST: &str = r#"<!DOCTYPE html>
<html>
<head><title>Diversity and Speech | ADR</title><style>p { color: red; }</style></head>
<body>
  <header><h1>American Diversity Report</h1><nav><a href="/">Home</a></nav></header>
  <h1>Diversity and Speech Part 18: Hate Speech</h1>
  <article>
    <p>First real paragraph of the post, long enough to keep.</p>
    <p>Too short</p>
    <h2>A section heading here</h2>
    <script>var tracking = "this should never show up";</script>
    <ul><li>A list item that is   definitely
        long enough.</li></ul>
    <blockquote>A quoted passage from the author.</blockquote>
    <aside><p>Related posts you might enjoy reading.</p></aside>
  </article>
  <footer><p>Copyright notice for the whole site.</p></footer>
</body>
</html>"#;

    #[test]
    fn test_extracts_title_and_blocks_from_container() {
        let page = extract_blog_text(POST);
        assert!(page.used_container);

        let title = "Diversity and Speech Part 18: Hate Speech";
        let underline = "=".repeat(title.chars().count());
        let expected = [
            title,
            underline.as_str(),
            "",
            "First real paragraph of the post, long enough to keep.",
            "",
            "A section heading here",
            "",
            "A list item that is definitely long enough.",
            "",
            "A quoted passage from the author.",
            "",
        ]
        .join("\n");
        assert_eq!(page.text, expected);
    }

    #[test]
    fn test_skipped_elements_never_leak() {
        let page = extract_blog_text(POST);
        assert!(!page.text.contains("tracking"));
        assert!(!page.text.contains("Related posts"));
        assert!(!page.text.contains("Copyright"));
        assert!(!page.text.contains("American Diversity Report"));
    }

    #[test]
    fn test_underline_matches_title_characters() {
        let html = "<html><body><h1>Gaúcho</h1><main><p>Paragraph with enough text.</p></main></body></html>";
        let page = extract_blog_text(html);
        let mut lines = page.text.lines();
        assert_eq!(lines.next(), Some("Gaúcho"));
        assert_eq!(lines.next(), Some("======"));
    }

    #[test]
    fn test_missing_title_is_unknown() {
        let html = "<html><body><div class=\"entry-content\"><p>Paragraph with enough text.</p></div></body></html>";
        let page = extract_blog_text(html);
        assert!(page.used_container);
        assert!(page.text.starts_with("Unknown\n=======\n\n"));
    }

    #[test]
    fn test_empty_h1_is_passed_over() {
        let html = "<html><body><h1> </h1><h1>Real Title</h1><main><p>Paragraph with enough text.</p></main></body></html>";
        let page = extract_blog_text(html);
        assert!(page.text.starts_with("Real Title\n==========\n\n"));
    }

    #[test]
    fn test_article_is_preferred_over_main() {
        let html = r#"<html><body>
            <main><p>Main paragraph that is long.</p></main>
            <article><p>Article paragraph that is long.</p></article>
        </body></html>"#;
        let page = extract_blog_text(html);
        assert!(page.text.contains("Article paragraph"));
        assert!(!page.text.contains("Main paragraph"));
    }

    #[test]
    fn test_fallback_without_container() {
        let html = r#"<html><head><title>Page</title><script>x()</script></head>
            <body><div>  First line  </div><nav>Menu</nav><div>Second</div></body></html>"#;
        let page = extract_blog_text(html);
        assert!(!page.used_container);
        assert_eq!(page.text, "Page\nFirst line\nSecond");
    }

    #[test]
    fn test_extract_to_file_and_record() {
        let temp = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        let html_path = layout.source_path(ResourceType::BlogPosts, "post.html");

        let words = extract_to_file(&layout, "post", POST).unwrap();
        record_extraction(&layout, "post", &html_path, words).unwrap();

        let text =
            std::fs::read_to_string(layout.extracted_path(ResourceType::BlogPosts, "post")).unwrap();
        assert_eq!(word_count(&text), words);

        let meta = sidecar::load(&layout.metadata_path(ResourceType::BlogPosts, "post")).unwrap();
        let extraction = meta.extraction.unwrap();
        assert_eq!(extraction.status, ExtractionStatus::Completed);
        assert_eq!(extraction.method, Some(ExtractionMethod::ParsedFromHtml));
        assert_eq!(extraction.word_count, Some(words));
        let file_info = meta.file_info.unwrap();
        assert_eq!(file_info.html_path.as_deref(), Some("sources/blog_posts/post.html"));
        assert_eq!(file_info.txt_path.as_deref(), Some("extracted/blog_posts/post.txt"));
    }

    #[test]
    fn test_record_extraction_keeps_bibliographic_fields() {
        let temp = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        let meta_path = layout.metadata_path(ResourceType::BlogPosts, "post");
        std::fs::create_dir_all(meta_path.parent().unwrap()).unwrap();
        std::fs::write(
            &meta_path,
            r#"{"id": "blog_post", "title": "Diversity and Speech", "resource_type": "blog_post",
                "series": "Diversity and Speech",
                "extraction": {"status": "completed", "method": "beautifulsoup"}}"#,
        )
        .unwrap();

        let html_path = layout.source_path(ResourceType::BlogPosts, "post.html");
        record_extraction(&layout, "post", &html_path, 42).unwrap();

        let meta = sidecar::load(&meta_path).unwrap();
        assert_eq!(meta.id.as_deref(), Some("blog_post"));
        assert_eq!(meta.title.as_deref(), Some("Diversity and Speech"));
        assert_eq!(meta.series.as_deref(), Some("Diversity and Speech"));
        assert_eq!(meta.resource_type, Some(ResourceType::BlogPosts));
        let extraction = meta.extraction.unwrap();
        assert_eq!(extraction.method, Some(ExtractionMethod::ParsedFromHtml));
        assert_eq!(extraction.word_count, Some(42));
    }

    #[tokio::test]
    async fn test_malformed_sidecar_survives_re_extraction() {
        let temp = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        let dir = layout.sources_dir(ResourceType::BlogPosts);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("post.html"), POST).unwrap();
        let meta_path = layout.metadata_path(ResourceType::BlogPosts, "post");
        std::fs::create_dir_all(meta_path.parent().unwrap()).unwrap();
        std::fs::write(&meta_path, "{\"title\": ").unwrap();

        assert_eq!(extract_saved_pages(&layout).await, (1, 0));
        assert!(layout.extracted_path(ResourceType::BlogPosts, "post").is_file());
        assert_eq!(std::fs::read_to_string(&meta_path).unwrap(), "{\"title\": ");
    }

    #[tokio::test]
    async fn test_extract_saved_pages() {
        let temp = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        let dir = layout.sources_dir(ResourceType::BlogPosts);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a.html"), POST).unwrap();
        std::fs::write(dir.join("b.html"), "<html><body><p>hi there</p></body></html>").unwrap();
        std::fs::write(dir.join("notes.txt"), "not html").unwrap();

        assert_eq!(extract_saved_pages(&layout).await, (2, 0));
        assert!(layout.extracted_path(ResourceType::BlogPosts, "a").is_file());
        assert!(layout.extracted_path(ResourceType::BlogPosts, "b").is_file());
        assert!(!layout.extracted_path(ResourceType::BlogPosts, "notes").exists());
    }

    #[tokio::test]
    async fn test_extract_saved_pages_without_directory() {
        let temp = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(temp.path());
        assert_eq!(extract_saved_pages(&layout).await, (0, 0));
    }
}
