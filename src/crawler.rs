use crate::browser::{BrowserError, ChromeSession, RenderedPage};
use crate::config::{Config, ReaderSettings};
use crate::metrics::BatchMetrics;
use crate::sources::mangalivre::{ChapterReport, ChapterWalker, ListingCrawler, MangaInfoScraper};
use crate::store::{JsonStore, StoreError};
use std::sync::Arc;
use std::time::Duration;

/// What happened to one series URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MangaOutcome {
    Saved {
        title: String,
        chapters: Vec<ChapterReport>,
    },
    Skipped {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MangaReport {
    pub url: String,
    pub outcome: MangaOutcome,
}

impl MangaReport {
    fn skipped(url: &str, reason: impl ToString) -> Self {
        Self {
            url: url.to_string(),
            outcome: MangaOutcome::Skipped {
                reason: reason.to_string(),
            },
        }
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub reports: Vec<MangaReport>,
    pub metrics: BatchMetrics,
}

/// Extract one series, walk all its chapters and store the result.
/// Failures are reported, never propagated.
pub fn scrape_manga<S: RenderedPage>(
    session: &mut S,
    settings: &ReaderSettings,
    store: &JsonStore,
    url: &str,
) -> MangaReport {
    let mut manga = match MangaInfoScraper::new(session, settings).get_manga_info(url) {
        Ok(manga) => manga,
        Err(e) => {
            log::warn!("Skipping {}: {}", url, e);
            return MangaReport::skipped(url, e);
        }
    };

    let chapters = ChapterWalker::new(session, settings).walk_manga(&mut manga);

    match store.put(&manga) {
        Ok(_) => MangaReport {
            url: url.to_string(),
            outcome: MangaOutcome::Saved {
                title: manga.title,
                chapters,
            },
        },
        Err(e) => {
            log::error!("Failed to store {}: {}", url, e);
            MangaReport::skipped(url, e)
        }
    }
}

/// Process `urls` in order with one session, then close it
pub fn scrape_batch<S: RenderedPage>(
    mut session: S,
    settings: &ReaderSettings,
    store: &JsonStore,
    urls: &[String],
) -> Vec<MangaReport> {
    let reports = urls
        .iter()
        .map(|url| scrape_manga(&mut session, settings, store, url))
        .collect();

    if let Err(e) = session.close() {
        log::warn!("Error closing browser session: {}", e);
    }
    reports
}

/// Split `urls` into at most `workers` contiguous, non-empty chunks
pub fn split_work(urls: Vec<String>, workers: usize) -> Vec<Vec<String>> {
    if urls.is_empty() {
        return Vec::new();
    }
    let workers = workers.clamp(1, urls.len());
    let chunk_size = urls.len().div_ceil(workers);
    urls.chunks(chunk_size).map(<[String]>::to_vec).collect()
}

/// Orchestrates a full run: listing, extraction, chapter walking, storage
pub struct Crawler {
    config: Config,
    store: Arc<JsonStore>,
}

impl Crawler {
    pub fn new(config: Config) -> Result<Self, StoreError> {
        let store = JsonStore::open(&config.output_dir)?;
        Ok(Self {
            config,
            store: Arc::new(store),
        })
    }

    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    /// Series URLs from the configured range of index pages
    pub async fn discover(&self) -> Result<Vec<String>, reqwest::Error> {
        let listing = &self.config.listing;
        let crawler = ListingCrawler::new(self.config.create_http_client()?, listing.base_url.as_str());

        let urls = crawler
            .list_manga_urls(
                listing.page_start,
                listing.page_end,
                Duration::from_millis(listing.sleep_between_pages_ms),
            )
            .await;

        log::info!(
            "Discovered {} series on index pages {}..={}",
            urls.len(),
            listing.page_start,
            listing.page_end
        );
        Ok(urls)
    }

    /// Scrape `urls` with headless Chrome
    pub async fn run(&self, urls: Vec<String>) -> Result<RunSummary, BrowserError> {
        let browser = self.config.browser.clone();
        self.run_with(urls, move || ChromeSession::open(browser.clone()))
            .await
    }

    /// Scrape `urls` with sessions from `open`, one per worker. A session
    /// that fails to open aborts the run.
    pub async fn run_with<S, F>(&self, urls: Vec<String>, open: F) -> Result<RunSummary, BrowserError>
    where
        S: RenderedPage + 'static,
        F: Fn() -> Result<S, BrowserError> + Send + Sync + 'static,
    {
        let open = Arc::new(open);
        let mut handles = Vec::new();

        for chunk in split_work(urls, self.config.workers) {
            let open = Arc::clone(&open);
            let store = Arc::clone(&self.store);
            let settings = self.config.reader.clone();

            handles.push(tokio::task::spawn_blocking(move || {
                let session = open()?;
                Ok::<_, BrowserError>(scrape_batch(session, &settings, &store, &chunk))
            }));
        }

        let mut reports = Vec::new();
        let mut launch_error = None;
        for handle in handles {
            match handle.await {
                Ok(Ok(worker_reports)) => reports.extend(worker_reports),
                Ok(Err(e)) => {
                    log::error!("Browser session could not be opened: {}", e);
                    launch_error.get_or_insert(e);
                }
                Err(e) => log::error!("Scrape worker panicked: {}", e),
            }
        }

        if let Some(e) = launch_error {
            return Err(e);
        }

        let mut metrics = BatchMetrics::new();
        let mut titles = Vec::new();
        for report in &reports {
            metrics.record(report);
            if let MangaOutcome::Saved { title, .. } = &report.outcome {
                titles.push(title.clone());
            }
        }
        metrics.finish();

        if let Err(e) = self.store.merge_title_list(&titles) {
            log::warn!("Could not update the title list: {}", e);
        }

        Ok(RunSummary { reports, metrics })
    }
}
