// src/scrape/report.rs
use std::path::PathBuf;

use serde::Serialize;

use crate::roic::models::{Category, FinancialType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CategoryOutcome {
    Written { path: PathBuf },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    pub category: Category,
    #[serde(flatten)]
    pub outcome: CategoryOutcome,
}

/// What happened to one (ticker, group) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GroupOutcome {
    /// Already on disk from an earlier run; nothing fetched.
    AlreadyScraped,
    /// The site does not cover this ticker. Not an error.
    Unsupported,
    /// Produced by copying the primary symbol's output.
    Mirrored { primary: String },
    /// Navigation, page-ready wait or manifest I/O failed; retried next run.
    Failed { reason: String },
    Scraped { categories: Vec<CategoryReport> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupReport {
    pub ticker: String,
    pub group: FinancialType,
    #[serde(flatten)]
    pub outcome: GroupOutcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub written: usize,
    pub failed: usize,
    pub resumed: usize,
    pub unsupported: usize,
    pub group_failures: usize,
    pub mirrored_files: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub summary: RunSummary,
    pub groups: Vec<GroupReport>,
}

impl RunReport {
    pub fn push(&mut self, ticker: &str, group: FinancialType, outcome: GroupOutcome) {
        let summary = &mut self.summary;
        match &outcome {
            GroupOutcome::AlreadyScraped => summary.resumed += 1,
            GroupOutcome::Unsupported => summary.unsupported += 1,
            GroupOutcome::Mirrored { .. } => {}
            GroupOutcome::Failed { .. } => summary.group_failures += 1,
            GroupOutcome::Scraped { categories } => {
                for report in categories {
                    match report.outcome {
                        CategoryOutcome::Written { .. } => summary.written += 1,
                        CategoryOutcome::Failed { .. } => summary.failed += 1,
                    }
                }
            }
        }
        self.groups.push(GroupReport { ticker: ticker.to_string(), group, outcome });
    }

    pub fn record_mirrored(&mut self, files: usize) {
        self.summary.mirrored_files += files;
    }

    pub fn outcome(&self, ticker: &str, group: FinancialType) -> Option<&GroupOutcome> {
        self.groups
            .iter()
            .find(|r| r.ticker == ticker && r.group == group)
            .map(|r| &r.outcome)
    }
}
