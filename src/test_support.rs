// src/test_support.rs
//! In-memory page driver and page fixtures laid out like the site's default
//! positions (see `config::default_locators`).

use std::collections::HashMap;

use scraper::Html;
use url::Url;

use crate::roic::driver::PageDriver;
use crate::roic::models::{Category, FinancialType};
use crate::utils::error::DriverError;

pub const SITE_BASE: &str = "https://roic.test";

/// Serves canned pages per URL. Each `refresh` advances to the next snapshot
/// of the current URL and then stays on the last one.
#[derive(Default)]
pub struct FakeDriver {
    pages: HashMap<String, Vec<String>>,
    current: Option<(String, usize)>,
    page: Option<Html>,
    visited: Vec<String>,
    refreshes: usize,
}

impl FakeDriver {
    pub fn add_page(&mut self, url: &str, html: &str) {
        self.add_snapshots(url, vec![html.to_string()]);
    }

    pub fn add_snapshots(&mut self, url: &str, snapshots: Vec<String>) {
        assert!(!snapshots.is_empty());
        self.pages.insert(url.to_string(), snapshots);
    }

    pub fn navigations(&self) -> usize {
        self.visited.len()
    }

    pub fn visited(&self) -> &[String] {
        &self.visited
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes
    }
}

impl PageDriver for FakeDriver {
    async fn navigate(&mut self, url: &Url) -> Result<(), DriverError> {
        self.visited.push(url.to_string());
        self.page = None;
        self.current = None;

        let snapshots = self.pages.get(url.as_str()).ok_or_else(|| DriverError::Http {
            status: reqwest::StatusCode::NOT_FOUND,
            url: url.to_string(),
        })?;
        self.page = Some(Html::parse_document(&snapshots[0]));
        self.current = Some((url.to_string(), 0));
        Ok(())
    }

    async fn refresh(&mut self) -> Result<(), DriverError> {
        self.refreshes += 1;
        let (url, index) = self.current.as_mut().ok_or(DriverError::NoPage)?;
        let snapshots = &self.pages[url.as_str()];
        *index = (*index + 1).min(snapshots.len() - 1);
        self.page = Some(Html::parse_document(&snapshots[*index]));
        Ok(())
    }

    fn page(&self) -> Option<&Html> {
        self.page.as_ref()
    }
}

/// A table region: header row of cells, then a body of rows.
pub fn table(header: &[&str], rows: &[&[&str]]) -> String {
    let cells = |cs: &[&str]| cs.iter().map(|c| format!("<div>{}</div>", c)).collect::<String>();
    let body: String = rows.iter().map(|r| format!("<div>{}</div>", cells(r))).collect();
    format!("<div><div>{}</div><div>{}</div></div>", cells(header), body)
}

fn page_shell(navigation: &str, sections: &str) -> String {
    format!(
        "<html><body><div><div></div><div><div></div><div>{}{}</div></div></div></body></html>",
        navigation, sections
    )
}

/// A supported group page. Categories without an entry get an empty section.
pub fn group_page(group: FinancialType, tables: &[(Category, String)]) -> String {
    let tabs: String = group
        .categories()
        .iter()
        .map(|c| format!("<a>{}</a>", c))
        .collect();
    let sections: String = group
        .categories()
        .iter()
        .map(|category| {
            let inner = tables
                .iter()
                .find(|(c, _)| c == category)
                .map(|(_, html)| format!("<div>{}</div>", html))
                .unwrap_or_default();
            format!("<div>{}</div>", inner)
        })
        .collect();
    page_shell(&format!("<div class=\"tabs\">{}</div>", tabs), &sections)
}

/// The placeholder the site renders for listings it does not cover.
pub fn unsupported_page() -> String {
    page_shell("<div class=\"tabs\"><p>This market is not supported yet.</p></div>", "")
}
