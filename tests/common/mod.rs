//! In-memory stand-in for a browser session on mangalivre.net.
//!
//! Series pages are served as static markup; chapter readers keep the
//! state the real reader keeps (current page, age gate) and render it into
//! the same DOM shape the real reader produces.
#![allow(dead_code)]

use mangalivre_scraper::browser::{BrowserError, Lookup, PageElement, RenderedPage};
use mangalivre_scraper::config::ReaderSettings;
use mangalivre_scraper::sources::mangalivre::ReaderSelectors;
use std::collections::HashMap;
use std::time::Duration;

pub const SERIES_URL: &str = "https://mangalivre.net/manga/dorohedoro/728";
pub const MISSING_TITLE_URL: &str = "https://mangalivre.net/manga/removida/999";

pub fn chapter_url(n: u32) -> String {
    format!("https://mangalivre.net/ler/dorohedoro/online/{}/capitulo-{}", n, n)
}

pub fn image_url(chapter: u32, page: usize) -> String {
    format!("https://img.mangalivre.net/dorohedoro/{}/{:02}.jpg", chapter, page)
}

/// Reader settings with timeouts short enough for tests
pub fn fast_settings() -> ReaderSettings {
    ReaderSettings {
        wait_timeout_ms: 50,
        age_gate_timeout_ms: 10,
        navigation_backoff_ms: 5,
        settle_timeout_ms: 20,
        poll_interval_ms: 1,
        ..ReaderSettings::default()
    }
}

#[derive(Debug, Clone)]
pub struct FakeChapter {
    /// `src` of each page in reading order; "" renders an img without src
    pub images: Vec<String>,
    /// Text of the page-count element; `None` never renders it
    pub page_count_text: Option<String>,
    pub label: Option<String>,
    /// Text of the adult-content gate; `None` never renders it
    pub age_gate_text: Option<String>,
    pub next_button: bool,
    /// "next" accepts clicks but the reader never changes page
    pub stuck: bool,
    pub confirm_clickable: bool,
    /// The confirm control is clickable but the click is rejected
    pub confirm_click_fails: bool,
}

impl FakeChapter {
    pub fn with_pages(chapter: u32, pages: usize) -> Self {
        Self {
            images: (1..=pages).map(|p| image_url(chapter, p)).collect(),
            page_count_text: Some(pages.to_string()),
            label: Some(chapter.to_string()),
            age_gate_text: None,
            next_button: true,
            stuck: false,
            confirm_clickable: true,
            confirm_click_fails: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeSeries {
    pub html: String,
    /// Document height after 0, 1, 2... scrolls; the last value repeats
    pub heights: Vec<u64>,
}

#[derive(Debug, Default)]
pub struct FakeSite {
    pub selectors: ReaderSelectors,
    pub chapters: HashMap<String, FakeChapter>,
    pub series: HashMap<String, FakeSeries>,
    /// Remaining navigation failures per URL
    pub navigation_failures: HashMap<String, usize>,

    current: Option<String>,
    page_index: usize,
    gate_confirmed: bool,
    scrolls: usize,
    closed: bool,

    pub navigations: Vec<String>,
    pub clicks: Vec<String>,
    pub close_calls: usize,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chapter(mut self, url: impl Into<String>, chapter: FakeChapter) -> Self {
        self.chapters.insert(url.into(), chapter);
        self
    }

    pub fn with_series(mut self, url: impl Into<String>, html: impl Into<String>, heights: Vec<u64>) -> Self {
        self.series.insert(
            url.into(),
            FakeSeries {
                html: html.into(),
                heights,
            },
        );
        self
    }

    pub fn failing_navigation(mut self, url: impl Into<String>, times: usize) -> Self {
        self.navigation_failures.insert(url.into(), times);
        self
    }

    /// Dorohedoro with chapters 2 (3 pages) and 1 (4 pages), plus a series
    /// page whose title node was removed
    pub fn dorohedoro() -> Self {
        Self::new()
            .with_series(SERIES_URL, dorohedoro_series_html(), vec![1000, 1800, 1800])
            .with_series(
                MISSING_TITLE_URL,
                r#"<html><body><div id="series-data"><span class="series-author">x</span></div></body></html>"#,
                vec![900],
            )
            .with_chapter(chapter_url(2), FakeChapter::with_pages(2, 3))
            .with_chapter(chapter_url(1), FakeChapter::with_pages(1, 4))
    }

    pub fn next_clicks(&self) -> usize {
        self.clicks.iter().filter(|s| **s == self.selectors.next_page).count()
    }

    pub fn confirm_clicks(&self) -> usize {
        self.clicks
            .iter()
            .filter(|s| **s == self.selectors.age_gate_confirm)
            .count()
    }

    fn chapter(&self) -> Option<&FakeChapter> {
        self.current.as_ref().and_then(|url| self.chapters.get(url))
    }

    fn gate_blocking(&self) -> bool {
        !self.gate_confirmed
            && self
                .chapter()
                .and_then(|c| c.age_gate_text.as_ref())
                .is_some_and(|text| !text.trim().is_empty())
    }

    fn visible_text(&self, selector: &str) -> Option<String> {
        let chapter = self.chapter()?;
        let s = &self.selectors;

        if selector == s.age_gate {
            return if self.gate_confirmed { None } else { chapter.age_gate_text.clone() };
        }
        if self.gate_blocking() {
            return None;
        }
        if selector == s.page_count {
            chapter.page_count_text.clone()
        } else if selector == s.chapter_number {
            chapter.label.clone()
        } else {
            None
        }
    }

    fn clickable_text(&self, selector: &str) -> Option<String> {
        let chapter = self.chapter()?;
        let s = &self.selectors;

        if selector == s.age_gate_confirm && self.gate_blocking() && chapter.confirm_clickable {
            Some("Sim, tenho mais de 18 anos".to_string())
        } else if selector == s.next_page && !self.gate_blocking() && chapter.next_button {
            Some(String::new())
        } else {
            None
        }
    }

    fn reader_html(&self, chapter: &FakeChapter) -> String {
        let img = match chapter.images.get(self.page_index) {
            Some(src) if !src.is_empty() => format!(r#"<img src="{}">"#, src),
            _ => "<img>".to_string(),
        };
        format!(
            r#"<html><body><div id="reader-wrapper">
                <div class="reader-navigation clear-fix"></div>
                <div class="reader-content fit horizontal"><div class="manga-page"><div>{}</div></div></div>
            </div></body></html>"#,
            img
        )
    }

    fn ensure_open(&self) -> Result<(), BrowserError> {
        if self.closed {
            Err(BrowserError::Closed)
        } else {
            Ok(())
        }
    }
}

impl RenderedPage for FakeSite {
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.ensure_open()?;
        self.navigations.push(url.to_string());

        if let Some(remaining) = self.navigation_failures.get_mut(url) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(BrowserError::NavigationError(format!("Navigation timeout for {}", url)));
            }
        }

        self.current = Some(url.to_string());
        self.page_index = 0;
        self.gate_confirmed = false;
        self.scrolls = 0;
        Ok(())
    }

    fn current_url(&mut self) -> Result<String, BrowserError> {
        self.ensure_open()?;
        Ok(self.current.clone().unwrap_or_else(|| "about:blank".to_string()))
    }

    fn wait_for_visible(&mut self, selector: &str, _timeout: Duration) -> Result<Lookup, BrowserError> {
        self.ensure_open()?;
        Ok(match self.visible_text(selector) {
            Some(text) => Lookup::Found(PageElement {
                selector: selector.to_string(),
                text,
            }),
            None => Lookup::TimedOut,
        })
    }

    fn wait_for_clickable(&mut self, selector: &str, _timeout: Duration) -> Result<Lookup, BrowserError> {
        self.ensure_open()?;
        Ok(match self.clickable_text(selector) {
            Some(text) => Lookup::Found(PageElement {
                selector: selector.to_string(),
                text,
            }),
            None => Lookup::TimedOut,
        })
    }

    fn current_dom(&mut self) -> Result<String, BrowserError> {
        self.ensure_open()?;
        let Some(url) = self.current.clone() else {
            return Ok("<html><body></body></html>".to_string());
        };
        if let Some(series) = self.series.get(&url) {
            return Ok(series.html.clone());
        }
        Ok(match self.chapters.get(&url) {
            Some(chapter) => self.reader_html(chapter),
            None => "<html><body></body></html>".to_string(),
        })
    }

    fn click(&mut self, element: &PageElement) -> Result<(), BrowserError> {
        self.ensure_open()?;
        self.clicks.push(element.selector.clone());

        let (stuck, confirm_click_fails, last) = self
            .chapter()
            .map(|c| (c.stuck, c.confirm_click_fails, c.images.len().saturating_sub(1)))
            .unwrap_or((false, false, 0));

        if element.selector == self.selectors.next_page {
            if !stuck {
                self.page_index = (self.page_index + 1).min(last);
            }
            Ok(())
        } else if element.selector == self.selectors.age_gate_confirm {
            if confirm_click_fails {
                return Err(BrowserError::JavaScriptError("click intercepted by overlay".to_string()));
            }
            self.gate_confirmed = true;
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound(element.selector.clone()))
        }
    }

    fn scroll_to_bottom(&mut self) -> Result<(), BrowserError> {
        self.ensure_open()?;
        self.scrolls += 1;
        Ok(())
    }

    fn page_height(&mut self) -> Result<u64, BrowserError> {
        self.ensure_open()?;
        let heights = self
            .current
            .as_ref()
            .and_then(|url| self.series.get(url))
            .map(|s| s.heights.as_slice())
            .unwrap_or(&[]);
        Ok(heights
            .get(self.scrolls)
            .or_else(|| heights.last())
            .copied()
            .unwrap_or(1000))
    }

    fn close(&mut self) -> Result<(), BrowserError> {
        self.closed = true;
        self.close_calls += 1;
        Ok(())
    }
}

pub fn dorohedoro_series_html() -> String {
    format!(
        r#"<html><body>
        <div id="series-data">
            <img class="cover" src="https://static.mangalivre.net/capas/dorohedoro.jpg">
            <span class="series-title"><h1>Dorohedoro</h1></span>
            <i class="complete-series">Completo</i>
            <span class="series-author"><i class="icon-user"></i> Q Hayashida </span>
            <div class="carousel"><a><span>Ação</span></a><a><span>Terror</span></a></div>
            <span class="series-desc"><span>Caiman procura quem o transformou.</span></span>
            <ol class="series-synom"><li>ドロヘドロ</li></ol>
        </div>
        <div id="chapter-list"><ul class="full-chapters-list">
            <li><a class="link-dark" href="{}"><span class="cap-text">2</span></a></li>
            <li><a class="link-dark" href="{}"><span class="cap-text">1</span></a></li>
        </ul></div>
        </body></html>"#,
        "/ler/dorohedoro/online/2/capitulo-2",
        "/ler/dorohedoro/online/1/capitulo-1"
    )
}
