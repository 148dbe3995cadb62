// src/universe.rs
use std::path::PathBuf;
use std::time::Duration;

use reqwest::header;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::extractors::dom::{child_elements, element_text};
use crate::utils::error::UniverseError;

pub const SP500_CONSTITUENTS_URL: &str = "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";

/// Where the ordered list of tickers comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UniverseSource {
    /// Symbols given directly.
    Symbols { symbols: Vec<String> },
    /// One symbol per line; blank lines and `#` comments are ignored.
    File { path: PathBuf },
    /// A column of an HTML reference table (rows without `td` cells, such as
    /// the header row, are skipped).
    Table { url: String, row_selector: String, column: usize },
}

impl Default for UniverseSource {
    fn default() -> Self {
        UniverseSource::Table {
            url: SP500_CONSTITUENTS_URL.to_string(),
            row_selector: "table#constituents > tbody > tr".to_string(),
            column: 0,
        }
    }
}

/// Resolves the universe. Any failure here is fatal to the run.
pub async fn load_tickers(source: &UniverseSource, request_timeout: Duration) -> Result<Vec<String>, UniverseError> {
    let raw = match source {
        UniverseSource::Symbols { symbols } => symbols.clone(),
        UniverseSource::File { path } => {
            let content = tokio::fs::read_to_string(path).await?;
            parse_symbol_lines(&content)
        }
        UniverseSource::Table { url, row_selector, column } => {
            let body = fetch_reference_page(url, request_timeout).await?;
            parse_reference_table(&body, row_selector, *column)?
        }
    };

    let tickers = clean_symbols(raw);
    if tickers.is_empty() {
        return Err(UniverseError::Empty);
    }
    tracing::info!("Loaded {} tickers", tickers.len());
    Ok(tickers)
}

async fn fetch_reference_page(url: &str, request_timeout: Duration) -> Result<String, UniverseError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("roic_scraper/", env!("CARGO_PKG_VERSION")))
        .timeout(request_timeout)
        .build()?;

    tracing::info!("Downloading ticker universe from: {}", url);
    let response = client.get(url)
        .header(header::ACCEPT, "text/html,*/*")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        tracing::error!("HTTP error status: {} for URL: {}", status, url);
        return Err(UniverseError::Http(status));
    }
    Ok(response.text().await?)
}

fn parse_symbol_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_reference_table(html: &str, row_selector: &str, column: usize) -> Result<Vec<String>, UniverseError> {
    let rows = Selector::parse(row_selector)
        .map_err(|e| UniverseError::Parse(format!("invalid row selector '{}': {}", row_selector, e)))?;
    let document = Html::parse_document(html);

    let mut symbols = Vec::new();
    for row in document.select(&rows) {
        let cells: Vec<_> = child_elements(row)
            .into_iter()
            .filter(|cell| cell.value().name() == "td")
            .collect();
        if let Some(cell) = cells.get(column) {
            symbols.push(element_text(*cell));
        }
    }

    if symbols.is_empty() {
        return Err(UniverseError::Parse(format!("no rows matched '{}'", row_selector)));
    }
    Ok(symbols)
}

/// Trims, upper-cases and de-duplicates while keeping first-seen order.
fn clean_symbols(raw: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.into_iter()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
