use super::config::BrowserConfig;
use super::manager::{BrowserError, BrowserManager};
use super::wait::poll_for;
use super::{Lookup, PageElement, RenderedPage};
use headless_chrome::Tab;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// [`RenderedPage`] backed by one headless Chrome process and one tab
pub struct ChromeSession {
    manager: Option<BrowserManager>,
    tab: Option<Arc<Tab>>,
}

impl ChromeSession {
    /// Launch the browser and open the working tab
    pub fn open(config: BrowserConfig) -> Result<Self, BrowserError> {
        let manager = BrowserManager::launch(config)?;
        let tab = manager.new_tab()?;

        Ok(Self {
            manager: Some(manager),
            tab: Some(tab),
        })
    }

    /// Launch with the default configuration and the given headless flag
    pub fn open_headless(headless: bool) -> Result<Self, BrowserError> {
        Self::open(BrowserConfig {
            headless,
            ..BrowserConfig::default()
        })
    }

    pub fn is_open(&self) -> bool {
        self.tab.is_some()
    }

    fn tab(&self) -> Result<&Arc<Tab>, BrowserError> {
        self.tab.as_ref().ok_or(BrowserError::Closed)
    }

    fn evaluate(&self, script: &str) -> Result<Option<Value>, BrowserError> {
        let result = self
            .tab()?
            .evaluate(script, false)
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;
        Ok(result.value)
    }

    /// Poll a probe script that returns the element text, or null while the
    /// element is not ready.
    fn wait_for_probe(&self, selector: &str, probe: &str, timeout: Duration) -> Result<Lookup, BrowserError> {
        let found = poll_for(timeout, POLL_INTERVAL, || match self.evaluate(probe)? {
            Some(Value::String(text)) => Ok(Some(text)),
            _ => Ok(None),
        })?;

        Ok(match found {
            Some(text) => Lookup::Found(PageElement {
                selector: selector.to_string(),
                text,
            }),
            None => {
                log::debug!("Timed out after {:?} waiting for {}", timeout, selector);
                Lookup::TimedOut
            }
        })
    }
}

/// Quote a selector as a JavaScript string literal
fn js_string(selector: &str) -> String {
    Value::String(selector.to_string()).to_string()
}

fn visible_probe(selector: &str) -> String {
    format!(
        r#"(() => {{
            const el = document.querySelector({});
            if (!el) return null;
            const style = window.getComputedStyle(el);
            const rect = el.getBoundingClientRect();
            if (style.display === 'none' || style.visibility === 'hidden') return null;
            if (rect.width === 0 && rect.height === 0) return null;
            return el.innerText || '';
        }})()"#,
        js_string(selector)
    )
}

fn clickable_probe(selector: &str) -> String {
    format!(
        r#"(() => {{
            const el = document.querySelector({});
            if (!el || el.disabled) return null;
            const style = window.getComputedStyle(el);
            const rect = el.getBoundingClientRect();
            if (style.display === 'none' || style.visibility === 'hidden') return null;
            if (style.pointerEvents === 'none') return null;
            if (rect.width === 0 && rect.height === 0) return null;
            return el.innerText || '';
        }})()"#,
        js_string(selector)
    )
}

fn click_script(selector: &str) -> String {
    format!(
        r#"(() => {{
            const el = document.querySelector({});
            if (!el) return false;
            el.click();
            return true;
        }})()"#,
        js_string(selector)
    )
}

impl RenderedPage for ChromeSession {
    fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        log::debug!("Browser navigating to: {}", url);
        let tab = self.tab()?;

        tab.navigate_to(url)
            .map_err(|e| BrowserError::NavigationError(format!("Failed to navigate to {}: {}", url, e)))?;

        tab.wait_until_navigated()
            .map_err(|e| BrowserError::NavigationError(format!("Navigation timeout for {}: {}", url, e)))?;

        Ok(())
    }

    fn current_url(&mut self) -> Result<String, BrowserError> {
        Ok(self.tab()?.get_url())
    }

    fn wait_for_visible(&mut self, selector: &str, timeout: Duration) -> Result<Lookup, BrowserError> {
        self.wait_for_probe(selector, &visible_probe(selector), timeout)
    }

    fn wait_for_clickable(&mut self, selector: &str, timeout: Duration) -> Result<Lookup, BrowserError> {
        self.wait_for_probe(selector, &clickable_probe(selector), timeout)
    }

    fn current_dom(&mut self) -> Result<String, BrowserError> {
        self.tab()?
            .get_content()
            .map_err(|e| BrowserError::HtmlExtractionError(e.to_string()))
    }

    fn click(&mut self, element: &PageElement) -> Result<(), BrowserError> {
        match self.evaluate(&click_script(&element.selector))? {
            Some(Value::Bool(true)) => Ok(()),
            _ => Err(BrowserError::ElementNotFound(element.selector.clone())),
        }
    }

    fn scroll_to_bottom(&mut self) -> Result<(), BrowserError> {
        self.evaluate("window.scrollTo(0, document.documentElement.scrollHeight);")?;
        Ok(())
    }

    fn page_height(&mut self) -> Result<u64, BrowserError> {
        self.evaluate("document.body.scrollHeight")?
            .and_then(|v| v.as_f64())
            .map(|h| h as u64)
            .ok_or_else(|| BrowserError::JavaScriptError("Script returned no value".to_string()))
    }

    fn close(&mut self) -> Result<(), BrowserError> {
        if let Some(tab) = self.tab.take() {
            if let Err(e) = tab.close(false) {
                log::debug!("Tab close failed: {}", e);
            }
        }
        // Dropping the browser kills the process
        if self.manager.take().is_some() {
            log::debug!("Browser session closed");
        }
        Ok(())
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
