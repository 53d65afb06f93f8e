use rand::Rng;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use std::time::Duration;
use tokio::time::sleep;

/// Desktop user agents rotated per request; the index pages answer 403 to
/// clients without one
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub max_retries: usize,
    pub initial_retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
    pub enable_cookies: bool,
    pub enable_gzip: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 4,
            initial_retry_delay_ms: 500,
            max_retry_delay_ms: 8000,
            enable_cookies: true,
            enable_gzip: true,
        }
    }
}

/// HTTP client for the static listing pages, retrying transient failures
pub struct EnhancedHttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl EnhancedHttpClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self, reqwest::Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7"),
        );

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(Self::random_user_agent())
            .cookie_store(config.enable_cookies)
            .gzip(config.enable_gzip)
            .brotli(config.enable_gzip)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    fn random_user_agent() -> &'static str {
        let index = rand::thread_rng().gen_range(0..USER_AGENTS.len());
        USER_AGENTS[index]
    }

    /// Exponential backoff capped at the configured maximum, with ±25% jitter
    fn calculate_retry_delay(&self, attempt: usize) -> Duration {
        let delay_ms = self
            .config
            .initial_retry_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt as u32))
            .min(self.config.max_retry_delay_ms);

        let jitter = rand::thread_rng().gen_range(0.75..=1.25);
        Duration::from_millis((delay_ms as f64 * jitter) as u64)
    }

    fn is_retryable_status(status: StatusCode) -> bool {
        matches!(
            status.as_u16(),
            429 | 500 | 502 | 503 | 504 | 520 | 521 | 522 | 523 | 524 | 525 | 526 | 527
        )
    }

    fn is_retryable_error(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect() || err.is_request()
    }

    /// GET with retries. Non-retryable error statuses are returned as
    /// responses, not errors.
    pub async fn get_with_retry(&self, url: &str) -> Result<Response, reqwest::Error> {
        let mut attempt = 0;

        loop {
            let result = self
                .client
                .get(url)
                .header(reqwest::header::USER_AGENT, Self::random_user_agent())
                .send()
                .await;

            let retry = attempt < self.config.max_retries
                && match &result {
                    Ok(response) => Self::is_retryable_status(response.status()),
                    Err(e) => Self::is_retryable_error(e),
                };

            if !retry {
                return result;
            }

            match &result {
                Ok(response) => log::warn!(
                    "Received retryable status {} for {}, attempt {}/{}",
                    response.status(),
                    url,
                    attempt + 1,
                    self.config.max_retries + 1
                ),
                Err(e) => log::warn!(
                    "Request failed for {}, attempt {}/{}: {}",
                    url,
                    attempt + 1,
                    self.config.max_retries + 1,
                    e
                ),
            }

            sleep(self.calculate_retry_delay(attempt)).await;
            attempt += 1;
        }
    }

    /// Body of a successful response, or `None` for any other status
    pub async fn get_page(&self, url: &str) -> Result<Option<String>, reqwest::Error> {
        let response = self.get_with_retry(url).await?;
        let status = response.status();

        if !status.is_success() {
            log::warn!("Got status {} for {}", status, url);
            return Ok(None);
        }

        response.text().await.map(Some)
    }
}
