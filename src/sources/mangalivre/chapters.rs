//! Chapter page walker
//!
//! The reader shows one page at a time and renders it with JavaScript, so a
//! chapter's images are collected by driving the reader: open the chapter,
//! get past the adult-content gate, read the page count, then repeatedly
//! read the displayed image and click "next".

use super::selectors::parse_selector;
use crate::browser::wait::poll_until;
use crate::browser::{BrowserError, Lookup, RenderedPage};
use crate::config::ReaderSettings;
use crate::models::{Chapter, Manga};
use scraper::{Html, Selector};
use std::time::Duration;

/// Why a chapter was walked only partially
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// Both navigation attempts failed; the reader was read as it was
    NavigationFailed(String),
    PageCountTimedOut,
    PageCountNotANumber(String),
    /// The gate was showing but could not be clicked through
    AgeConfirmationFailed(String),
    /// Collection stopped before the last step; pages read so far are kept
    CollectionInterrupted { collected: usize, reason: String },
    Session(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterOutcome {
    Complete,
    Degraded(Vec<Degradation>),
}

/// Result of walking one chapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterReport {
    pub url: String,
    pub navigation_attempts: u32,
    pub age_restricted: bool,
    pub number_of_pages: u32,
    pub pages_collected: usize,
    pub outcome: ChapterOutcome,
}

impl ChapterReport {
    pub fn is_complete(&self) -> bool {
        self.outcome == ChapterOutcome::Complete
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PageCountError {
    #[error("timed out waiting for the page count")]
    TimedOut,

    #[error("page count {0:?} is not a number")]
    NotANumber(String),

    #[error(transparent)]
    Session(#[from] BrowserError),
}

impl From<PageCountError> for Degradation {
    fn from(err: PageCountError) -> Self {
        match err {
            PageCountError::TimedOut => Degradation::PageCountTimedOut,
            PageCountError::NotANumber(text) => Degradation::PageCountNotANumber(text),
            PageCountError::Session(e) => Degradation::Session(e.to_string()),
        }
    }
}

/// Drives one session through the chapters of a manga, in order.
///
/// The session is borrowed, not owned: a worker opens one session and
/// reuses it for every chapter before closing it.
pub struct ChapterWalker<'a, S: RenderedPage> {
    session: &'a mut S,
    settings: &'a ReaderSettings,
}

impl<'a, S: RenderedPage> ChapterWalker<'a, S> {
    pub fn new(session: &'a mut S, settings: &'a ReaderSettings) -> Self {
        Self { session, settings }
    }

    /// Fill in the pages of every chapter of `manga`
    pub fn walk_manga(&mut self, manga: &mut Manga) -> Vec<ChapterReport> {
        log::info!("Walking {} chapters of {}", manga.chapters.len(), manga.title);
        manga
            .chapters
            .iter_mut()
            .map(|chapter| self.walk(chapter, false))
            .collect()
    }

    /// Collect the pages of one chapter stub, writing them back into it
    pub fn walk_chapter(&mut self, chapter: &mut Chapter) -> ChapterReport {
        self.walk(chapter, false)
    }

    /// Build chapters from bare reader URLs, taking each label from the
    /// reader's current-chapter node
    pub fn walk_urls(&mut self, urls: &[String]) -> Vec<(Chapter, ChapterReport)> {
        urls.iter()
            .map(|url| {
                let mut chapter = Chapter::stub("", url.as_str());
                let report = self.walk(&mut chapter, true);
                (chapter, report)
            })
            .collect()
    }

    fn walk(&mut self, chapter: &mut Chapter, read_label: bool) -> ChapterReport {
        let mut degradations = Vec::new();

        let (navigation_attempts, loaded) = self.go_to_chapter(&chapter.url, &mut degradations);

        // The tab still shows whatever was loaded before, so nothing on it
        // belongs to this chapter
        if !loaded {
            if read_label {
                chapter.number_of_chapter = String::new();
            }
            chapter.number_of_pages = 0;
            chapter.pages = Vec::new();
            return ChapterReport {
                url: chapter.url.clone(),
                navigation_attempts,
                age_restricted: false,
                number_of_pages: 0,
                pages_collected: 0,
                outcome: ChapterOutcome::Degraded(degradations),
            };
        }

        let age_restricted = self.is_age_restricted();
        if age_restricted {
            log::info!("Chapter is age restricted, confirming: {}", chapter.url);
            if let Err(reason) = self.confirm_age() {
                log::warn!("Could not confirm age for {}: {}", chapter.url, reason);
                degradations.push(Degradation::AgeConfirmationFailed(reason));
            }
        }

        let number_of_pages = match self.number_of_pages() {
            Ok(count) => count,
            Err(e) => {
                log::warn!("Error reading the number of pages of {}: {}", chapter.url, e);
                degradations.push(e.into());
                0
            }
        };

        if read_label {
            chapter.number_of_chapter = self.chapter_label();
        }

        let pages = match self.collect_pages(number_of_pages) {
            Ok(pages) => pages,
            Err((pages, reason)) => {
                log::warn!(
                    "Stopped collecting {} after {} pages: {}",
                    chapter.url,
                    pages.len(),
                    reason
                );
                degradations.push(Degradation::CollectionInterrupted {
                    collected: pages.len(),
                    reason,
                });
                pages
            }
        };

        log::debug!(
            "Chapter {} ({}): {} pages, {} collected",
            chapter.number_of_chapter,
            chapter.url,
            number_of_pages,
            pages.len()
        );

        chapter.number_of_pages = number_of_pages;
        chapter.pages = pages;

        ChapterReport {
            url: chapter.url.clone(),
            navigation_attempts,
            age_restricted,
            number_of_pages,
            pages_collected: chapter.pages.len(),
            outcome: if degradations.is_empty() {
                ChapterOutcome::Complete
            } else {
                ChapterOutcome::Degraded(degradations)
            },
        }
    }

    /// Navigate, retrying once after a fixed backoff. Returns the number of
    /// attempts made and whether the chapter loaded; a second failure is
    /// recorded as a degradation.
    fn go_to_chapter(&mut self, url: &str, degradations: &mut Vec<Degradation>) -> (u32, bool) {
        if !url.starts_with(&self.settings.reader_url_prefix) {
            log::warn!("Invalid reader URL, navigating anyway: {}", url);
        }

        let Err(first) = self.session.navigate(url) else {
            return (1, true);
        };

        log::warn!(
            "Navigation to {} failed ({}), retrying in {:?}",
            url,
            first,
            self.settings.navigation_backoff()
        );
        std::thread::sleep(self.settings.navigation_backoff());

        match self.session.navigate(url) {
            Ok(()) => (2, true),
            Err(second) => {
                log::warn!("Navigation to {} failed again: {}", url, second);
                degradations.push(Degradation::NavigationFailed(second.to_string()));
                (2, false)
            }
        }
    }

    /// Whether the adult-content gate is showing. A gate that never
    /// appears, or appears without text, means the chapter is not gated.
    pub fn is_age_restricted(&mut self) -> bool {
        let selector = &self.settings.selectors.age_gate;
        match self
            .session
            .wait_for_visible(selector, self.settings.age_gate_timeout())
        {
            Ok(Lookup::Found(gate)) => !gate.text.trim().is_empty(),
            Ok(Lookup::TimedOut) => false,
            Err(e) => {
                log::debug!("Age gate check failed, assuming no gate: {}", e);
                false
            }
        }
    }

    /// Click through the adult-content gate and wait for it to go away
    pub fn confirm_age(&mut self) -> Result<(), String> {
        let selectors = &self.settings.selectors;
        let confirm = match self
            .session
            .wait_for_clickable(&selectors.age_gate_confirm, self.settings.wait_timeout())
        {
            Ok(Lookup::Found(button)) => button,
            Ok(Lookup::TimedOut) => {
                return Err("age confirmation control never became clickable".to_string())
            }
            Err(e) => return Err(format!("age confirmation lookup failed: {}", e)),
        };

        self.session
            .click(&confirm)
            .map_err(|e| format!("age confirmation click failed: {}", e))?;

        let session = &mut *self.session;
        let gate_gone = poll_until(
            self.settings.settle_timeout(),
            self.settings.poll_interval(),
            || Ok(session.wait_for_visible(&selectors.age_gate, Duration::ZERO)?.is_timed_out()),
        );
        match gate_gone {
            Ok(true) => {}
            Ok(false) => log::debug!("Age gate still visible after confirming"),
            Err(e) => log::debug!("Could not verify the age gate closed: {}", e),
        }
        Ok(())
    }

    /// Total pages of the chapter currently loaded
    pub fn number_of_pages(&mut self) -> Result<u32, PageCountError> {
        let lookup = self
            .session
            .wait_for_visible(&self.settings.selectors.page_count, self.settings.wait_timeout())?;

        match lookup {
            Lookup::Found(element) => element
                .text
                .trim()
                .parse::<u32>()
                .map_err(|_| PageCountError::NotANumber(element.text)),
            Lookup::TimedOut => Err(PageCountError::TimedOut),
        }
    }

    /// Label of the chapter currently loaded, trimmed but otherwise as
    /// displayed; empty on timeout
    pub fn chapter_label(&mut self) -> String {
        match self.session.wait_for_visible(
            &self.settings.selectors.chapter_number,
            self.settings.wait_timeout(),
        ) {
            Ok(Lookup::Found(element)) => element.text.trim().to_string(),
            Ok(Lookup::TimedOut) => {
                log::warn!("Timed out reading the chapter number");
                String::new()
            }
            Err(e) => {
                log::warn!("Error reading the chapter number: {}", e);
                String::new()
            }
        }
    }

    /// Run `number_of_pages - 1` read-then-advance steps starting on the
    /// page the reader opened on. The image shown after the final click is
    /// never read.
    fn collect_pages(&mut self, number_of_pages: u32) -> Result<Vec<String>, (Vec<String>, String)> {
        let mut pages = Vec::new();
        let steps = number_of_pages.saturating_sub(1);
        if steps == 0 {
            return Ok(pages);
        }

        let selectors = &self.settings.selectors;
        let Some(image) = parse_selector(&selectors.page_image) else {
            return Err((pages, format!("invalid page image selector {}", selectors.page_image)));
        };

        for _ in 0..steps {
            let src = match read_image_src(&mut *self.session, &image) {
                Ok(src) => src,
                Err(e) => return Err((pages, e.to_string())),
            };
            if !src.is_empty() {
                pages.push(src.clone());
            }

            let next = match self
                .session
                .wait_for_clickable(&selectors.next_page, self.settings.wait_timeout())
            {
                Ok(Lookup::Found(next)) => next,
                Ok(Lookup::TimedOut) => {
                    return Err((pages, "next page control never became clickable".to_string()))
                }
                Err(e) => return Err((pages, e.to_string())),
            };

            if let Err(e) = self.session.click(&next) {
                return Err((pages, e.to_string()));
            }

            self.wait_for_page_change(&image, &src);
        }

        Ok(pages)
    }

    /// Wait until the displayed image differs from `previous`
    fn wait_for_page_change(&mut self, image: &Selector, previous: &str) {
        let session = &mut *self.session;
        let changed = poll_until(
            self.settings.settle_timeout(),
            self.settings.poll_interval(),
            || Ok(read_image_src(session, image)? != previous),
        );

        match changed {
            Ok(true) => {}
            Ok(false) => log::debug!(
                "Reader did not change page within {:?}",
                self.settings.settle_timeout()
            ),
            Err(e) => log::debug!("Error while waiting for the next page: {}", e),
        }
    }
}

/// `src` of the displayed page image, or "" when there is none
fn read_image_src<S: RenderedPage>(session: &mut S, image: &Selector) -> Result<String, BrowserError> {
    let dom = session.current_dom()?;
    let document = Html::parse_document(&dom);

    Ok(document
        .select(image)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(|src| src.trim().to_string())
        .unwrap_or_default())
}
