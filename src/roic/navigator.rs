// src/roic/navigator.rs
use std::time::Duration;

use scraper::Selector;
use tokio::time::Instant;
use url::Url;

use crate::roic::driver::PageDriver;
use crate::roic::models::{FinancialType, Period};
use crate::utils::error::PageError;

/// Bounds for the page-ready poll.
#[derive(Debug, Clone, Copy)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

/// Builds target URLs and loads them through a driver, waiting until the
/// rendered page contains the ready region.
pub struct Navigator {
    base_url: Url,
    ready: Selector,
    ready_descriptor: String,
    wait: WaitPolicy,
}

impl Navigator {
    pub fn new(base_url: Url, ready_descriptor: &str, wait: WaitPolicy) -> Result<Self, String> {
        if base_url.cannot_be_a_base() {
            return Err(format!("base URL '{}' cannot carry a path", base_url));
        }
        let ready = Selector::parse(ready_descriptor)
            .map_err(|e| format!("invalid ready descriptor '{}': {}", ready_descriptor, e))?;

        Ok(Self {
            base_url,
            ready,
            ready_descriptor: ready_descriptor.to_string(),
            wait,
        })
    }

    /// `{base}/{group}/{ticker}?fs={period}`
    pub fn build_url(&self, ticker: &str, group: FinancialType, period: Period) -> Url {
        let mut url = self.base_url.clone();
        // cannot-be-a-base URLs are rejected in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(group.as_str()).push(ticker);
        }
        url.query_pairs_mut().clear().append_pair("fs", period.as_str());
        url
    }

    /// Navigates and polls until the ready region is present. A page that
    /// never renders it within the timeout is `PageError::NotFound`.
    pub async fn load<D: PageDriver>(&self, driver: &mut D, url: &Url) -> Result<(), PageError> {
        tracing::info!("Loading {}", url);
        driver.navigate(url).await?;

        let started = Instant::now();
        loop {
            let ready = driver
                .page()
                .map_or(false, |page| page.select(&self.ready).next().is_some());
            if ready {
                tracing::debug!("Page ready after {:?}", started.elapsed());
                return Ok(());
            }

            if started.elapsed() + self.wait.poll_interval > self.wait.timeout {
                return Err(PageError::NotFound(format!(
                    "'{}' did not appear within {:?} on {}",
                    self.ready_descriptor, self.wait.timeout, url
                )));
            }

            tokio::time::sleep(self.wait.poll_interval).await;
            driver.refresh().await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeDriver, SITE_BASE};

    fn navigator(timeout_ms: u64) -> Navigator {
        Navigator::new(
            Url::parse(SITE_BASE).unwrap(),
            "#nav",
            WaitPolicy {
                timeout: Duration::from_millis(timeout_ms),
                poll_interval: Duration::from_millis(5),
            },
        )
        .unwrap()
    }

    #[test]
    fn builds_url_from_template() {
        let nav = navigator(100);
        let url = nav.build_url("AAPL", FinancialType::Financials, Period::Annual);
        assert_eq!(url.as_str(), "https://roic.test/financials/AAPL?fs=annual");

        let url = nav.build_url("BRK.B", FinancialType::Ratios, Period::Quarterly);
        assert_eq!(url.as_str(), "https://roic.test/ratios/BRK.B?fs=quarterly");
    }

    #[test]
    fn base_url_with_path_prefix_is_kept() {
        let nav = Navigator::new(
            Url::parse("https://mirror.test/site/").unwrap(),
            "#nav",
            WaitPolicy { timeout: Duration::from_millis(10), poll_interval: Duration::from_millis(1) },
        )
        .unwrap();
        let url = nav.build_url("MSFT", FinancialType::Financials, Period::Annual);
        assert_eq!(url.as_str(), "https://mirror.test/site/financials/MSFT?fs=annual");
    }

    #[test]
    fn rejects_bad_ready_descriptor() {
        let result = Navigator::new(
            Url::parse(SITE_BASE).unwrap(),
            "div[",
            WaitPolicy { timeout: Duration::from_millis(10), poll_interval: Duration::from_millis(1) },
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn waits_for_ready_region_across_refreshes() {
        let nav = navigator(1_000);
        let url = nav.build_url("AAPL", FinancialType::Financials, Period::Annual);
        let mut driver = FakeDriver::default();
        driver.add_snapshots(
            url.as_str(),
            vec![
                "<html><body><p>loading</p></body></html>".to_string(),
                "<html><body><p>still loading</p></body></html>".to_string(),
                "<html><body><div id=\"nav\"><a>x</a></div></body></html>".to_string(),
            ],
        );

        nav.load(&mut driver, &url).await.unwrap();
        assert_eq!(driver.navigations(), 1);
        assert_eq!(driver.refreshes(), 2);
    }

    #[tokio::test]
    async fn times_out_with_not_found() {
        let nav = navigator(30);
        let url = nav.build_url("AAPL", FinancialType::Financials, Period::Annual);
        let mut driver = FakeDriver::default();
        driver.add_page(url.as_str(), "<html><body><p>never ready</p></body></html>");

        let err = nav.load(&mut driver, &url).await.unwrap_err();
        assert!(matches!(err, PageError::NotFound(_)), "{err}");
    }
}
