// src/roic/driver.rs
use std::time::Duration;

use reqwest::header;
use scraper::Html;
use url::Url;

use crate::utils::error::DriverError;

const DRIVER_USER_AGENT: &str = concat!("roic_scraper/", env!("CARGO_PKG_VERSION"));

/// A single browsing session. Element handles (`scraper::ElementRef`) borrow
/// from `page()`, so none can survive a `navigate` or `refresh`: both take
/// `&mut self`.
#[allow(async_fn_in_trait)]
pub trait PageDriver {
    /// Loads `url`, replacing the current page.
    async fn navigate(&mut self, url: &Url) -> Result<(), DriverError>;

    /// Re-reads the current page. Used while waiting for client-side
    /// rendering to produce the expected region.
    async fn refresh(&mut self) -> Result<(), DriverError>;

    /// The currently loaded page, if any.
    fn page(&self) -> Option<&Html>;
}

/// Driver that fetches pages over HTTP. Pointing `render_proxy` at a
/// rendering service makes it see the DOM after scripts have run; the
/// percent-encoded target URL is appended to the proxy prefix.
pub struct HttpPageDriver {
    client: reqwest::Client,
    render_proxy: Option<String>,
    current_url: Option<Url>,
    page: Option<Html>,
}

impl HttpPageDriver {
    pub fn new(request_timeout: Duration, render_proxy: Option<String>) -> Result<Self, DriverError> {
        let client = reqwest::Client::builder()
            .user_agent(DRIVER_USER_AGENT)
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client,
            render_proxy,
            current_url: None,
            page: None,
        })
    }

    fn fetch_url(&self, url: &Url) -> String {
        match &self.render_proxy {
            Some(proxy) => format!("{}{}", proxy, urlencoding::encode(url.as_str())),
            None => url.to_string(),
        }
    }

    async fn load(&mut self, url: &Url) -> Result<(), DriverError> {
        let fetch_url = self.fetch_url(url);
        tracing::debug!("Fetching page from: {}", fetch_url);

        let response = self.client.get(&fetch_url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            return Err(DriverError::Http { status, url: url.to_string() });
        }

        let body = response.text().await?;
        tracing::debug!("Loaded {} bytes from {}", body.len(), url);

        self.page = Some(Html::parse_document(&body));
        self.current_url = Some(url.clone());
        Ok(())
    }
}

impl PageDriver for HttpPageDriver {
    async fn navigate(&mut self, url: &Url) -> Result<(), DriverError> {
        // Drop the old page first so a failed load never leaves stale content behind.
        self.page = None;
        self.current_url = None;
        self.load(url).await
    }

    async fn refresh(&mut self) -> Result<(), DriverError> {
        let url = self.current_url.clone().ok_or(DriverError::NoPage)?;
        self.load(&url).await
    }

    fn page(&self) -> Option<&Html> {
        self.page.as_ref()
    }
}
