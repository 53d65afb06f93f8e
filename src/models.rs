use serde::{Deserialize, Serialize};

/// Publication status shown on a series page
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MangaStatus {
    Complete,
    #[default]
    Ongoing,
}

/// A series and everything scraped for it.
///
/// Field order is the order of the stored JSON document.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Manga {
    pub title: String,
    pub url: String,
    pub author: String,
    pub alternative_titles: Vec<String>,
    pub cover: String,
    pub status: MangaStatus,
    pub categories: Vec<String>,
    pub description: String,
    pub chapters: Vec<Chapter>,
}

/// One chapter of a series. Created as a stub (no pages) by the metadata
/// extractor and filled in place by the chapter walker.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Chapter {
    /// Label as displayed by the site, e.g. "12" or "12.5 - Extra"
    pub number_of_chapter: String,
    pub url: String,
    pub pages: Vec<String>,
    pub number_of_pages: u32,
}

impl Chapter {
    pub fn stub(number_of_chapter: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            number_of_chapter: number_of_chapter.into(),
            url: url.into(),
            pages: Vec::new(),
            number_of_pages: 0,
        }
    }

    pub fn is_stub(&self) -> bool {
        self.pages.is_empty() && self.number_of_pages == 0
    }
}

impl Manga {
    /// Storage key: lowercase title with spaces replaced by hyphens
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }

    pub fn page_total(&self) -> usize {
        self.chapters.iter().map(|c| c.pages.len()).sum()
    }
}

pub fn slugify(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}
