use scraper::Selector;
use serde::Deserialize;

/// CSS selectors of the chapter reader.
///
/// The reader is rendered client-side, so these target the markup after
/// its scripts have run. Any of them can be overridden under
/// `[reader.selectors]` in `config.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ReaderSelectors {
    /// "N" in the "page X of N" navigation
    pub page_count: String,
    /// Image of the page currently displayed
    pub page_image: String,
    pub next_page: String,
    /// Current chapter label in the chapter selector
    pub chapter_number: String,
    /// Adult-content interstitial
    pub age_gate: String,
    pub age_gate_confirm: String,
}

impl Default for ReaderSelectors {
    fn default() -> Self {
        Self {
            page_count: "#reader-wrapper > div:nth-child(10) > div.page-navigation-wrapper > div > div.page-navigation > span > em:nth-child(2)".to_string(),
            page_image: "#reader-wrapper > div.reader-content.fit.horizontal > div.manga-page > div > img".to_string(),
            next_page: "#reader-wrapper > div:nth-child(10) > div.page-navigation-wrapper > div > div.page-next".to_string(),
            chapter_number: "#reader-wrapper > div.reader-navigation.clear-fix > div.chapter-selection-container > div.chapter-selection > span.current-chapter > em".to_string(),
            age_gate: "#reader-wrapper div.eighteen-plus-warning".to_string(),
            age_gate_confirm: "#reader-wrapper div.eighteen-plus-warning a.eighteen-plus-contents".to_string(),
        }
    }
}

/// Parse a configured selector, logging instead of failing on bad CSS
pub fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            log::warn!("Invalid CSS selector {:?}: {:?}", css, e);
            None
        }
    }
}
