//! The hand-maintained list of bibliography items the fetcher knows about.
//!
//! Filenames follow `<year>-Cortes-<Slug>` for documents and the (truncated)
//! URL slug for blog posts, so that a later manifest run can join sources,
//! text, and sidecars by stem.

use crate::models::ResourceType;
use crate::utils::truncate_chars;

/// Longest stem a blog post file may have.
pub const BLOG_STEM_MAX_CHARS: usize = 80;
/// Longest slug fragment used in a blog post id.
pub const BLOG_ID_MAX_CHARS: usize = 50;

/// A fulltext PDF on the ERIC file server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EricDoc {
    pub eric_id: &'static str,
    pub title: &'static str,
    pub year: i32,
}

impl EricDoc {
    pub fn file_name(&self) -> String {
        format!("{}-Cortes-{}.pdf", self.year, self.eric_id)
    }

    pub fn item_id(&self) -> String {
        self.eric_id.to_lowercase()
    }

    pub fn url(&self, eric_base_url: &str) -> String {
        format!(
            "{}/{}.pdf",
            eric_base_url.trim_end_matches('/'),
            self.eric_id
        )
    }
}

/// A book hosted on Archive.org.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveBook {
    pub item_id: &'static str,
    pub identifier: &'static str,
    /// Stem of the file saved under `sources/books/`.
    pub stem: &'static str,
    pub title: &'static str,
    pub year: i32,
    pub authors: &'static [&'static str],
    pub publisher: &'static str,
    /// Known PDF name inside the item; resolved from item metadata when `None`.
    pub pdf_name: Option<&'static str>,
}

impl ArchiveBook {
    pub fn file_name(&self) -> String {
        format!("{}.pdf", self.stem)
    }
}

/// Which blog series a post belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogSeries {
    DiversitySpeech,
    RenewingDiversity,
    Standalone,
}

impl BlogSeries {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogSeries::DiversitySpeech => "diversity_speech",
            BlogSeries::RenewingDiversity => "renewing_diversity",
            BlogSeries::Standalone => "standalone",
        }
    }
}

/// A post on the blog domain, addressed by slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlogPost {
    pub slug: &'static str,
    pub title: &'static str,
    pub series: BlogSeries,
}

impl BlogPost {
    pub fn url(&self, blog_base_url: &str) -> String {
        format!("{}/{}/", blog_base_url.trim_end_matches('/'), self.slug)
    }

    pub fn stem(&self) -> &'static str {
        truncate_chars(self.slug, BLOG_STEM_MAX_CHARS)
    }

    pub fn item_id(&self) -> String {
        format!("blog_{}", truncate_chars(self.slug, BLOG_ID_MAX_CHARS))
    }
}

pub const ERIC_RESOURCE: ResourceType = ResourceType::EricDocs;
pub const BOOK_RESOURCE: ResourceType = ResourceType::Books;
pub const BLOG_RESOURCE: ResourceType = ResourceType::BlogPosts;

pub const ERIC_DOCS: &[EricDoc] = &[
    EricDoc {
        eric_id: "ED079204",
        title: "Teaching the Chicano Experience",
        year: 1973,
    },
    EricDoc {
        eric_id: "ED304241",
        title: "The Education of Language Minority Students: A Contextual Interaction Model",
        year: 1986,
    },
];

const CORTES: &[&str] = &["Carlos E. Cortés"];

pub const ARCHIVE_BOOKS: &[ArchiveBook] = &[
    ArchiveBook {
        item_id: "cortes_2002_making_remaking",
        identifier: "makingremakingof0000cort",
        stem: "2002-Cortes-Making-Remaking-Multiculturalist",
        title: "The Making—and Remaking—of a Multiculturalist",
        year: 2002,
        authors: CORTES,
        publisher: "Teachers College Press",
        pdf_name: Some("makingremakingof0000cort.pdf"),
    },
    ArchiveBook {
        item_id: "cortes_1974_gaucho_politics",
        identifier: "gachopoliticsinb0000cort",
        stem: "1974-Cortes-Gaucho-Politics-Brazil",
        title: "Gaúcho Politics in Brazil: The Politics of Rio Grande do Sul, 1930-1964",
        year: 1974,
        authors: CORTES,
        publisher: "University of New Mexico Press",
        pdf_name: None,
    },
];

const fn speech(slug: &'static str, title: &'static str) -> BlogPost {
    BlogPost {
        slug,
        title,
        series: BlogSeries::DiversitySpeech,
    }
}

const fn renewing(slug: &'static str, title: &'static str) -> BlogPost {
    BlogPost {
        slug,
        title,
        series: BlogSeries::RenewingDiversity,
    }
}

pub const BLOG_POSTS: &[BlogPost] = &[
    speech(
        "speech-vs-diversity-diversity-vs-speech-by-carlos-e-cortes",
        "Speech vs. Diversity, Diversity vs. Speech",
    ),
    speech(
        "diversity-vs-free-speech-part-1-an-invented-conflict-by-carlos-e-cortes",
        "Diversity vs. Free Speech Part 1: An Invented Conflict",
    ),
    speech(
        "diversity-and-speech-part-10-harmful-speech-2070-by-carlos-e-cortes",
        "Diversity and Speech Part 10: Harmful Speech 2070",
    ),
    speech(
        "diversity-and-speech-part-11-dehumanizing-speech-2070-by-carlos-e-cortes",
        "Diversity and Speech Part 11: Dehumanizing Speech 2070",
    ),
    speech(
        "diversity-speech-part-15-english-language-learners-by-carlos-cortes",
        "Diversity & Speech Part 15: English Language Learners",
    ),
    speech(
        "diversity-speech-part-16-creating-an-anti-racism-vision-statement-by-carlos-e-cortes",
        "Diversity & Speech Part 16: Creating an Anti-Racism Vision Statement",
    ),
    speech(
        "diversity-and-speech-part-18-hate-speech-by-carlos-e-cortes",
        "Diversity and Speech Part 18: Hate Speech",
    ),
    speech(
        "diversity-and-speech-no-27-training-future-psychologists-using-the-lens-of-history-by-carlos-e-cortes-marjorie-graham-howard",
        "Diversity and Speech No. 27: Training Future Psychologists",
    ),
    speech(
        "diversity-and-speech-33-bi-religious-by-carlos-cortes-gary-cortes",
        "Diversity and Speech #33: Bi-religious",
    ),
    speech(
        "diversity-and-speech-part-44-generations-of-gender-talk-by-carlos-cortes",
        "Diversity and Speech Part 44: Generations of Gender Talk",
    ),
    speech(
        "diversity-and-speech-no-46-the-art-of-turning-90-by-carlos-cortes",
        "Diversity and Speech No. 46: The Art of Turning 90",
    ),
    speech(
        "diversity-and-speech-part-14-health-equity-by-carlos-cortes-adwoa-osei",
        "Diversity and Speech Part 14: Health Equity",
    ),
    renewing(
        "renewing-diversity-1-high-school-ethnic-studies-by-carlos-cortes",
        "Renewing Diversity #1: High School Ethnic Studies",
    ),
    renewing(
        "renewing-diversity-part-9-rediscovering-my-professional-journey-by-carlos-cortes",
        "Renewing Diversity Part 9: Rediscovering My Professional Journey",
    ),
    BlogPost {
        slug: "from-conditional-to-equitable-inclusion-by-carlos-cortes",
        title: "From Conditional to Equitable Inclusion",
        series: BlogSeries::Standalone,
    },
];

/// Alternate slugs for posts missing from [`BLOG_POSTS`]. The site is
/// inconsistent about `part-N` versus bare `N`, so both spellings are probed.
pub const CANDIDATE_BLOG_POSTS: &[BlogPost] = &[
    speech(
        "diversity-and-speech-part-25-growing-up-bi-religious-by-carlos-cortes",
        "Diversity and Speech #25: Growing Up Bi-religious",
    ),
    speech(
        "diversity-and-speech-25-growing-up-bi-religious-by-carlos-cortes",
        "Diversity and Speech #25: Growing Up Bi-religious",
    ),
    speech(
        "diversity-and-speech-part-31-health-equity-by-carlos-cortes",
        "Diversity and Speech Part 31: Health Equity",
    ),
    speech(
        "diversity-and-speech-31-health-equity-by-carlos-cortes",
        "Diversity and Speech Part 31: Health Equity",
    ),
    speech(
        "diversity-and-speech-part-32-language-tensions-by-carlos-cortes",
        "Diversity and Speech Part 32: Language Tensions",
    ),
    speech(
        "diversity-and-speech-32-language-tensions-by-carlos-cortes",
        "Diversity and Speech Part 32: Language Tensions",
    ),
    speech(
        "diversity-and-speech-part-34-revisiting-privilege-by-carlos-cortes",
        "Diversity and Speech Part 34: Revisiting Privilege",
    ),
    speech(
        "diversity-and-speech-34-revisiting-privilege-by-carlos-cortes",
        "Diversity and Speech Part 34: Revisiting Privilege",
    ),
    speech(
        "diversity-and-speech-part-38-conversations-at-the-cheech-by-carlos-cortes",
        "Diversity and Speech Part 38: Conversations at The Cheech",
    ),
    speech(
        "diversity-and-speech-38-conversations-at-the-cheech-by-carlos-cortes",
        "Diversity and Speech Part 38: Conversations at The Cheech",
    ),
    speech(
        "diversity-and-speech-part-39-creating-health-equity-by-carlos-cortes",
        "Diversity and Speech Part 39: Creating Health Equity",
    ),
    speech(
        "diversity-and-speech-39-creating-health-equity-by-carlos-cortes",
        "Diversity and Speech Part 39: Creating Health Equity",
    ),
    renewing(
        "renewing-diversity-2-teaching-health-equity-by-carlos-cortes",
        "Renewing Diversity #2: Teaching Health Equity",
    ),
    renewing(
        "renewing-diversity-part-2-teaching-health-equity-by-carlos-cortes",
        "Renewing Diversity Part 2: Teaching Health Equity",
    ),
    renewing(
        "renewing-diversity-3-we-failed-george-floyd-by-carlos-cortes",
        "Renewing Diversity #3: We Failed George Floyd",
    ),
    renewing(
        "renewing-diversity-part-3-we-failed-george-floyd-by-carlos-cortes",
        "Renewing Diversity Part 3: We Failed George Floyd",
    ),
    renewing(
        "renewing-diversity-4-a-sliver-of-bone-by-carlos-cortes",
        "Renewing Diversity No. 4: A Sliver of Bone",
    ),
    renewing(
        "renewing-diversity-no-4-a-sliver-of-bone-by-carlos-cortes",
        "Renewing Diversity No. 4: A Sliver of Bone",
    ),
    renewing(
        "renewing-diversity-part-8-updating-the-classics-by-carlos-cortes",
        "Renewing Diversity Part 8: Updating the Classics",
    ),
    renewing(
        "renewing-diversity-8-updating-the-classics-by-carlos-cortes",
        "Renewing Diversity Part 8: Updating the Classics",
    ),
    renewing(
        "renewing-diversity-part-10-unpacking-the-inclusivity-dilemma-by-carlos-cortes",
        "Renewing Diversity Part 10: Unpacking the Inclusivity Dilemma",
    ),
    renewing(
        "renewing-diversity-10-unpacking-the-inclusivity-dilemma-by-carlos-cortes",
        "Renewing Diversity Part 10: Unpacking the Inclusivity Dilemma",
    ),
    renewing(
        "renewing-diversity-part-11-the-mysterious-world-of-diversity-and-economics-by-carlos-cortes",
        "Renewing Diversity Part 11: Diversity and Economics",
    ),
    renewing(
        "renewing-diversity-11-the-mysterious-world-of-diversity-and-economics-by-carlos-cortes",
        "Renewing Diversity Part 11: Diversity and Economics",
    ),
];

/// Archive.org advanced-search queries for books by the author.
pub const ARCHIVE_SEARCH_QUERIES: &[&str] = &[
    r#"creator:"Carlos Cortes" AND mediatype:texts"#,
    r#"creator:"Carlos E. Cortes" AND mediatype:texts"#,
    r#"title:"multicultural" AND creator:"cortes""#,
    r#"title:"children are watching" AND creator:"cortes""#,
    r#"title:"gaucho politics""#,
];

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    #[test]
    fn test_eric_doc_naming() {
        let doc = ERIC_DOCS[0];
        assert_eq!(doc.file_name(), "1973-Cortes-ED079204.pdf");
        assert_eq!(doc.item_id(), "ed079204");
        assert_eq!(
            doc.url("https://files.eric.ed.gov/fulltext/"),
            "https://files.eric.ed.gov/fulltext/ED079204.pdf"
        );
    }

    #[test]
    fn test_blog_post_naming() {
        let post = BLOG_POSTS[7];
        assert!(post.slug.chars().count() > BLOG_STEM_MAX_CHARS);
        assert_eq!(post.stem().chars().count(), BLOG_STEM_MAX_CHARS);
        assert!(post.slug.starts_with(post.stem()));
        assert_eq!(post.item_id().len(), "blog_".len() + BLOG_ID_MAX_CHARS);
        assert_eq!(
            post.url("https://americandiversityreport.com"),
            format!("https://americandiversityreport.com/{}/", post.slug)
        );
    }

    #[test]
    fn test_catalog_stems_are_unique() {
        assert!(BLOG_POSTS.iter().map(|p| p.stem()).all_unique());
        assert!(
            BLOG_POSTS
                .iter()
                .chain(CANDIDATE_BLOG_POSTS)
                .map(|p| p.slug)
                .all_unique()
        );
        assert!(ERIC_DOCS.iter().map(|d| d.file_name()).all_unique());
        assert!(ARCHIVE_BOOKS.iter().map(|b| b.stem).all_unique());
    }
}
