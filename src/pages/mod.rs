//! Page objects: one typed wrapper per screen of the store.
//!
//! Every page implements [`Loadable`]. Constructors that navigate do so
//! immediately; callers then `load` the page before touching its elements.
//! Action methods hand back the next page in the flow.

pub mod orders;
pub mod receipt;
pub mod signin;

#[cfg(test)]
mod tests;

pub use orders::{OrderLink, OrdersSummaryPage};
pub use receipt::OrderPage;
pub use signin::{EmailPage, OneTimeCodePage, PasswordPage};

use crate::config::Timing;
use crate::error::{Result, ScrapeError};
use crate::session::{BrowserSession, Locator};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// A screen that can tell whether it has finished rendering
#[async_trait]
pub trait Loadable: Send + Sync {
    /// Human readable page name used in errors and logs
    fn name(&self) -> &str;

    fn timing(&self) -> Timing;

    /// Non-blocking readiness probe; lookup failures count as "not ready yet"
    async fn did_load(&self) -> bool;

    /// Wait until [`Loadable::did_load`] holds or `timeout` elapses
    async fn load(&self, timeout: Duration) -> Result<()> {
        wait_until(self.name(), timeout, self.timing().poll_interval, || {
            self.did_load()
        })
        .await
    }
}

/// Poll `probe` until it returns true.
///
/// The probe always runs at least once, even with a zero timeout.
pub async fn wait_until<F, Fut>(
    what: &str,
    timeout: Duration,
    poll_interval: Duration,
    mut probe: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let started = Instant::now();
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        if probe().await {
            ::log::trace!("{} ready after {} probe(s)", what, attempts);
            return Ok(());
        }

        let elapsed = started.elapsed();
        if elapsed >= timeout {
            ::log::debug!("{} not ready after {} probe(s)", what, attempts);
            return Err(ScrapeError::PageLoadTimeout {
                page: what.to_string(),
                waited: elapsed,
            });
        }
        tokio::time::sleep(poll_interval.min(timeout - elapsed)).await;
    }
}

/// True if every locator matches something on the current page
async fn all_present(session: &dyn BrowserSession, locators: &[&Locator]) -> bool {
    for locator in locators {
        if let Err(e) = session.find(locator).await {
            if !e.is_no_such_element() {
                ::log::debug!("Readiness probe for {} failed: {}", locator, e);
            }
            return false;
        }
    }
    true
}

#[cfg(test)]
mod wait_tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_wait_until_returns_once_probe_succeeds() {
        let calls = AtomicU32::new(0);
        wait_until("counter", Duration::from_secs(1), Duration::from_millis(1), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { n >= 2 }
        })
        .await
        .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_wait_until_times_out() {
        let err = wait_until("never", Duration::from_millis(20), Duration::from_millis(5), || {
            async { false }
        })
        .await
        .unwrap_err();
        match err {
            ScrapeError::PageLoadTimeout { page, waited } => {
                assert_eq!(page, "never");
                assert!(waited >= Duration::from_millis(20));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_zero_timeout_still_probes_once() {
        let calls = AtomicU32::new(0);
        let result = wait_until("instant", Duration::ZERO, Duration::from_millis(5), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { true }
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
