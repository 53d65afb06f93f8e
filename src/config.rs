use crate::browser::BrowserConfig;
use crate::sources::mangalivre::selectors::ReaderSelectors;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory of the JSON store
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Number of parallel workers, each with its own browser
    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub reader: ReaderSettings,

    #[serde(default)]
    pub listing: ListingConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

/// Timing and selectors used while driving the chapter reader
#[derive(Debug, Deserialize, Clone)]
pub struct ReaderSettings {
    /// Chapter URLs outside this prefix are still visited, with a warning
    #[serde(default = "default_reader_prefix")]
    pub reader_url_prefix: String,

    /// Bounded wait for page-count, chapter-label and control elements
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_ms: u64,

    /// Bounded wait for the adult-content gate; a timeout means no gate
    #[serde(default = "default_age_gate_timeout")]
    pub age_gate_timeout_ms: u64,

    /// Pause before the single navigation retry
    #[serde(default = "default_navigation_backoff")]
    pub navigation_backoff_ms: u64,

    /// Upper bound on waiting for the reader to re-render after a click
    /// or for the page to grow after a scroll
    #[serde(default = "default_settle_timeout")]
    pub settle_timeout_ms: u64,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_max_scroll_rounds")]
    pub max_scroll_rounds: usize,

    #[serde(default)]
    pub selectors: ReaderSelectors,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListingConfig {
    /// Index URL; the page number is appended
    #[serde(default = "default_listing_url")]
    pub base_url: String,

    #[serde(default = "default_page_start")]
    pub page_start: u32,

    #[serde(default = "default_page_end")]
    pub page_end: u32,

    #[serde(default)]
    pub sleep_between_pages_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    #[serde(default = "default_initial_retry_delay")]
    pub initial_retry_delay_ms: u64,

    #[serde(default = "default_max_retry_delay")]
    pub max_retry_delay_ms: u64,
}

fn default_output_dir() -> String { "json_db".to_string() }
fn default_workers() -> usize { 1 }
fn default_reader_prefix() -> String { crate::sources::mangalivre::READER_URL_PREFIX.to_string() }
fn default_wait_timeout() -> u64 { 60_000 }
fn default_age_gate_timeout() -> u64 { 3_000 }
fn default_navigation_backoff() -> u64 { 1_000 }
fn default_settle_timeout() -> u64 { 3_000 }
fn default_poll_interval() -> u64 { 100 }
fn default_max_scroll_rounds() -> usize { 200 }
fn default_listing_url() -> String { crate::sources::mangalivre::LISTING_URL.to_string() }
fn default_page_start() -> u32 { 1 }
fn default_page_end() -> u32 { 1 }
fn default_http_timeout() -> u64 { 30 }
fn default_max_retries() -> usize { 4 }
fn default_initial_retry_delay() -> u64 { 500 }
fn default_max_retry_delay() -> u64 { 8000 }

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            reader_url_prefix: default_reader_prefix(),
            wait_timeout_ms: default_wait_timeout(),
            age_gate_timeout_ms: default_age_gate_timeout(),
            navigation_backoff_ms: default_navigation_backoff(),
            settle_timeout_ms: default_settle_timeout(),
            poll_interval_ms: default_poll_interval(),
            max_scroll_rounds: default_max_scroll_rounds(),
            selectors: ReaderSelectors::default(),
        }
    }
}

impl ReaderSettings {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn age_gate_timeout(&self) -> Duration {
        Duration::from_millis(self.age_gate_timeout_ms)
    }

    pub fn navigation_backoff(&self) -> Duration {
        Duration::from_millis(self.navigation_backoff_ms)
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            base_url: default_listing_url(),
            page_start: default_page_start(),
            page_end: default_page_end(),
            sleep_between_pages_ms: 0,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout(),
            max_retries: default_max_retries(),
            initial_retry_delay_ms: default_initial_retry_delay(),
            max_retry_delay_ms: default_max_retry_delay(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            workers: default_workers(),
            browser: BrowserConfig::default(),
            reader: ReaderSettings::default(),
            listing: ListingConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Read `config.toml` from the working directory, falling back to
    /// defaults when it is missing or malformed
    pub fn load() -> Self {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match Self::from_toml_str(&content) {
                    Ok(cfg) => return cfg,
                    Err(e) => log::warn!("Ignoring malformed {}: {}", path.display(), e),
                },
                Err(e) => log::warn!("Could not read {}: {}", path.display(), e),
            }
        }
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Create the HTTP client used by the listing crawler
    pub fn create_http_client(&self) -> Result<crate::http_client::EnhancedHttpClient, reqwest::Error> {
        use crate::http_client::{EnhancedHttpClient, HttpClientConfig};

        let config = HttpClientConfig {
            timeout: Duration::from_secs(self.http.timeout_secs),
            max_retries: self.http.max_retries,
            initial_retry_delay_ms: self.http.initial_retry_delay_ms,
            max_retry_delay_ms: self.http.max_retry_delay_ms,
            enable_cookies: true,
            enable_gzip: true,
        };

        EnhancedHttpClient::with_config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.output_dir, "json_db");
        assert_eq!(config.workers, 1);
        assert_eq!(config.reader.wait_timeout(), Duration::from_secs(60));
        assert_eq!(config.reader.navigation_backoff(), Duration::from_secs(1));
        assert_eq!(config.reader.reader_url_prefix, "https://mangalivre.net/ler/");
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml_str(
            r#"
            output_dir = "out"
            workers = 3

            [browser]
            headless = false

            [reader]
            wait_timeout_ms = 500

            [reader.selectors]
            next_page = "button.next"

            [listing]
            page_start = 2
            page_end = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.output_dir, "out");
        assert_eq!(config.workers, 3);
        assert!(!config.browser.headless);
        assert_eq!(config.browser.window_size, (1920, 1080));
        assert_eq!(config.reader.wait_timeout_ms, 500);
        assert_eq!(config.reader.age_gate_timeout_ms, 3_000);
        assert_eq!(config.reader.selectors.next_page, "button.next");
        assert_eq!(
            config.reader.selectors.page_count,
            ReaderSelectors::default().page_count
        );
        assert_eq!((config.listing.page_start, config.listing.page_end), (2, 5));
        assert_eq!(config.http.max_retries, 4);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "workers = \"many\"").unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.workers, 1);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = Config::load_from(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.output_dir, "json_db");
    }
}
