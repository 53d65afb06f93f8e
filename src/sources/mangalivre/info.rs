//! Series page metadata
//!
//! The title is the only load-bearing field: without it there is nothing
//! to key the record by, so extraction fails. Every other field falls back
//! to an empty value (or `ONGOING` for the status).

use crate::browser::wait::poll_until;
use crate::browser::{BrowserError, RenderedPage};
use crate::config::ReaderSettings;
use crate::models::{Chapter, Manga, MangaStatus};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

const SERIES_DATA: &str = "div#series-data";
const TITLE: &str = "span.series-title h1";
const COVER: &str = "img.cover";
const COMPLETE_MARKER: &str = "i.complete-series";
const AUTHOR: &str = "span.series-author";
const CATEGORIES: &str = "div.carousel";
const DESCRIPTION: &str = "span.series-desc span";
const ALTERNATIVE_TITLES: &str = "ol.series-synom li";
const CHAPTER_ITEMS: &str = "div#chapter-list ul.full-chapters-list li";
const CHAPTER_LABEL: &str = "span.cap-text";
const CHAPTER_LINK: &str = "a.link-dark";

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("series data container not found")]
    MissingSeriesData,

    #[error("series title not found")]
    MissingTitle,

    #[error("invalid selector: {0}")]
    Selector(String),

    #[error("browser error: {0}")]
    Session(#[from] BrowserError),
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector(format!("{}: {:?}", css, e)))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_text(scope: ElementRef, css: &str) -> Result<Option<String>, ExtractError> {
    Ok(scope
        .select(&selector(css)?)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string()))
}

/// Parse a fully rendered series page into a manga with chapter stubs.
///
/// `page_url` is both the manga's canonical URL and the base that chapter
/// links are resolved against.
pub fn parse_manga(html: &str, page_url: &str) -> Result<Manga, ExtractError> {
    let document = Html::parse_document(html);

    let series = document
        .select(&selector(SERIES_DATA)?)
        .next()
        .ok_or(ExtractError::MissingSeriesData)?;

    let title = first_text(series, TITLE)?
        .filter(|t| !t.is_empty())
        .ok_or(ExtractError::MissingTitle)?;

    let cover = series
        .select(&selector(COVER)?)
        .next()
        .and_then(|img| img.value().attr("src"))
        .unwrap_or_default()
        .to_string();

    let status = if series.select(&selector(COMPLETE_MARKER)?).next().is_some() {
        MangaStatus::Complete
    } else {
        MangaStatus::Ongoing
    };

    // The author sits in a bare text node next to the label markup
    let author = series
        .select(&selector(AUTHOR)?)
        .next()
        .and_then(|span| {
            span.children()
                .filter_map(|node| node.value().as_text())
                .map(|text| collapse_whitespace(&text.text))
                .find(|text| !text.is_empty())
        })
        .unwrap_or_default();

    let categories = series
        .select(&selector(CATEGORIES)?)
        .next()
        .map(|carousel| {
            carousel
                .text()
                .map(collapse_whitespace)
                .filter(|c| !c.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let description = first_text(series, DESCRIPTION)?.unwrap_or_default();

    let alternative_titles = series
        .select(&selector(ALTERNATIVE_TITLES)?)
        .map(|li| li.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let chapters = parse_chapter_list(&document, page_url)?;

    Ok(Manga {
        title,
        url: page_url.to_string(),
        author,
        alternative_titles,
        cover,
        status,
        categories,
        description,
        chapters,
    })
}

/// Chapter stubs in the order the site lists them
pub fn parse_chapter_list(document: &Html, page_url: &str) -> Result<Vec<Chapter>, ExtractError> {
    let label_selector = selector(CHAPTER_LABEL)?;
    let link_selector = selector(CHAPTER_LINK)?;
    let base = Url::parse(page_url).ok();

    let mut chapters = Vec::new();
    for item in document.select(&selector(CHAPTER_ITEMS)?) {
        let label = item
            .select(&label_selector)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string());
        let href = item
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"));

        let (Some(label), Some(href)) = (label, href) else {
            log::warn!("Skipping malformed chapter entry on {}", page_url);
            continue;
        };

        chapters.push(Chapter::stub(label, resolve_url(base.as_ref(), href)));
    }

    Ok(chapters)
}

fn resolve_url(base: Option<&Url>, href: &str) -> String {
    base.and_then(|b| b.join(href).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| href.to_string())
}

/// Loads series pages in a session and extracts their metadata
pub struct MangaInfoScraper<'a, S: RenderedPage> {
    session: &'a mut S,
    settings: &'a ReaderSettings,
}

impl<'a, S: RenderedPage> MangaInfoScraper<'a, S> {
    pub fn new(session: &'a mut S, settings: &'a ReaderSettings) -> Self {
        Self { session, settings }
    }

    /// Open a series page, let the chapter list lazy-load, and parse it
    pub fn get_manga_info(&mut self, manga_url: &str) -> Result<Manga, ExtractError> {
        self.session.navigate(manga_url)?;

        if let Err(e) = self.load_full_page() {
            log::warn!("Chapter list may be incomplete for {}: {}", manga_url, e);
        }

        let page_url = self.session.current_url()?;
        let html = self.session.current_dom()?;
        let manga = parse_manga(&html, &page_url)?;

        log::info!(
            "Extracted {} ({} chapters) from {}",
            manga.title,
            manga.chapters.len(),
            manga_url
        );
        Ok(manga)
    }

    /// Scroll to the bottom until the page stops growing. Returns the
    /// number of scrolls that made the page grow.
    pub fn load_full_page(&mut self) -> Result<usize, BrowserError> {
        let mut last_height = self.session.page_height()?;

        for round in 0..self.settings.max_scroll_rounds {
            self.session.scroll_to_bottom()?;

            let session = &mut *self.session;
            let mut height = last_height;
            let grew = poll_until(
                self.settings.settle_timeout(),
                self.settings.poll_interval(),
                || {
                    height = session.page_height()?;
                    Ok(height != last_height)
                },
            )?;

            if !grew {
                return Ok(round);
            }
            last_height = height;
        }

        log::warn!(
            "Page still growing after {} scrolls",
            self.settings.max_scroll_rounds
        );
        Ok(self.settings.max_scroll_rounds)
    }
}
