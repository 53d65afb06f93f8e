use crate::http_client::EnhancedHttpClient;
use reqwest::Url;
use scraper::{Html, Selector};
use std::time::Duration;
use tokio::time::sleep;

/// Walks the static series index and collects series page URLs
pub struct ListingCrawler {
    client: EnhancedHttpClient,
    base_url: String,
}

impl ListingCrawler {
    /// `base_url` is the index URL the page number is appended to
    pub fn new(client: EnhancedHttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Series URLs on index pages `page_start..=page_end`, in page order.
    /// A page that cannot be fetched contributes nothing.
    pub async fn list_manga_urls(
        &self,
        page_start: u32,
        page_end: u32,
        sleep_between_pages: Duration,
    ) -> Vec<String> {
        let mut urls = Vec::new();

        for page_url in page_urls(&self.base_url, page_start, page_end) {
            match self.client.get_page(&page_url).await {
                Ok(Some(html)) => {
                    let found = parse_listing_page(&html, &self.base_url);
                    log::info!("Found {} series on {}", found.len(), page_url);
                    urls.extend(found);
                }
                Ok(None) => {}
                Err(e) => log::warn!("Failed to fetch listing page {}: {}", page_url, e),
            }

            if !sleep_between_pages.is_zero() {
                sleep(sleep_between_pages).await;
            }
        }

        urls
    }
}

/// Index URLs for the inclusive page range; empty when the range is invalid
pub fn page_urls(base_url: &str, page_start: u32, page_end: u32) -> Vec<String> {
    if page_start == 0 || page_end < page_start {
        return Vec::new();
    }
    (page_start..=page_end)
        .map(|page| format!("{}{}", base_url, page))
        .collect()
}

/// Series links of one index page, resolved against the index URL
pub fn parse_listing_page(html: &str, base_url: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse("a.link-block") else {
        return Vec::new();
    };
    let base = Url::parse(base_url).ok();
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| match &base {
            Some(base) => base.join(href).ok().map(|u| u.to_string()),
            None => Some(href.to_string()),
        })
        .collect()
}
