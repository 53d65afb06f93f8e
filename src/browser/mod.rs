//! Controlled browser session for JavaScript-rendered pages
//!
//! The scraping state machines only talk to a [`RenderedPage`], so they can
//! be driven by headless Chrome in production and by an in-memory fake in
//! tests.
//!
//! # Example
//!
//! ```no_run
//! use mangalivre_scraper::browser::{BrowserConfig, ChromeSession, Lookup, RenderedPage};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = ChromeSession::open(BrowserConfig::default())?;
//!
//! session.navigate("https://example.com")?;
//! if let Lookup::Found(h1) = session.wait_for_visible("h1", Duration::from_secs(10))? {
//!     println!("Heading: {}", h1.text);
//! }
//!
//! session.close()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod manager;
pub mod session;
pub mod wait;

use std::time::Duration;

pub use config::BrowserConfig;
pub use manager::{BrowserError, BrowserManager};
pub use session::ChromeSession;

/// Snapshot of an element taken when a wait succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageElement {
    /// Selector the element was located with; clicks re-resolve it
    pub selector: String,
    /// Rendered text of the element at lookup time
    pub text: String,
}

/// Outcome of a bounded wait. A timeout is a value, not an error, so
/// callers decide their own fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(PageElement),
    TimedOut,
}

impl Lookup {
    pub fn found(self) -> Option<PageElement> {
        match self {
            Lookup::Found(element) => Some(element),
            Lookup::TimedOut => None,
        }
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, Lookup::TimedOut)
    }
}

/// A single browser page executing the site's client-side JavaScript.
///
/// All operations act on the one active page; calls must be sequenced.
pub trait RenderedPage {
    /// Load a URL and wait for the navigation to finish
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    /// URL of the page currently loaded
    fn current_url(&mut self) -> Result<String, BrowserError>;

    /// Wait until an element matching `selector` is rendered and visible
    fn wait_for_visible(&mut self, selector: &str, timeout: Duration) -> Result<Lookup, BrowserError>;

    /// Wait until an element matching `selector` is visible and enabled
    fn wait_for_clickable(&mut self, selector: &str, timeout: Duration) -> Result<Lookup, BrowserError>;

    /// Snapshot of the rendered markup. Not live: fetch again after any
    /// interaction.
    fn current_dom(&mut self) -> Result<String, BrowserError>;

    /// Dispatch a click. The page re-renders asynchronously afterwards.
    fn click(&mut self, element: &PageElement) -> Result<(), BrowserError>;

    /// Scroll the window to the bottom of the document
    fn scroll_to_bottom(&mut self) -> Result<(), BrowserError>;

    /// Current scroll height of the document
    fn page_height(&mut self) -> Result<u64, BrowserError>;

    /// Terminate the browser. Calling it again is a no-op.
    fn close(&mut self) -> Result<(), BrowserError>;
}

impl<P: RenderedPage + ?Sized> RenderedPage for &mut P {
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        (**self).navigate(url)
    }

    fn current_url(&mut self) -> Result<String, BrowserError> {
        (**self).current_url()
    }

    fn wait_for_visible(&mut self, selector: &str, timeout: Duration) -> Result<Lookup, BrowserError> {
        (**self).wait_for_visible(selector, timeout)
    }

    fn wait_for_clickable(&mut self, selector: &str, timeout: Duration) -> Result<Lookup, BrowserError> {
        (**self).wait_for_clickable(selector, timeout)
    }

    fn current_dom(&mut self) -> Result<String, BrowserError> {
        (**self).current_dom()
    }

    fn click(&mut self, element: &PageElement) -> Result<(), BrowserError> {
        (**self).click(element)
    }

    fn scroll_to_bottom(&mut self) -> Result<(), BrowserError> {
        (**self).scroll_to_bottom()
    }

    fn page_height(&mut self) -> Result<u64, BrowserError> {
        (**self).page_height()
    }

    fn close(&mut self) -> Result<(), BrowserError> {
        (**self).close()
    }
}
