use super::BrowserError;
use std::time::{Duration, Instant};

/// Repeatedly run `probe` until it yields a value or `timeout` elapses.
///
/// The probe always runs at least once, even with a zero timeout. Returns
/// `Ok(None)` when the deadline passes without a value; errors from the
/// probe end the wait immediately.
pub fn poll_for<T, F>(timeout: Duration, interval: Duration, mut probe: F) -> Result<Option<T>, BrowserError>
where
    F: FnMut() -> Result<Option<T>, BrowserError>,
{
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(value) = probe()? {
            return Ok(Some(value));
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }

        std::thread::sleep(interval.min(deadline - now));
    }
}

/// Poll a completion predicate until it holds or `timeout` elapses.
/// Returns whether the predicate was satisfied.
pub fn poll_until<F>(timeout: Duration, interval: Duration, mut check: F) -> Result<bool, BrowserError>
where
    F: FnMut() -> Result<bool, BrowserError>,
{
    poll_for(timeout, interval, || Ok(check()?.then_some(()))).map(|hit| hit.is_some())
}
