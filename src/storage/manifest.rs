// src/storage/manifest.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::roic::models::{Category, FinancialType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub status: Status,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Where a group stands according to the manifest alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    /// No category of the group has been recorded.
    Missing,
    /// Started but never finished (interrupted run).
    Incomplete,
    /// Every category reached `Done` or `Failed`.
    Complete { failed: usize },
}

/// Per-ticker scrape state, stored as `<ticker>/manifest.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerManifest {
    pub ticker: String,
    /// Set when the site shows its "not supported" placeholder for the ticker.
    #[serde(default)]
    pub unsupported: bool,
    #[serde(default)]
    pub categories: BTreeMap<Category, CategoryRecord>,
}

impl TickerManifest {
    pub fn new(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            ..Self::default()
        }
    }

    pub fn set(&mut self, category: Category, status: Status, detail: Option<String>) {
        self.categories.insert(
            category,
            CategoryRecord {
                status,
                updated_at: chrono::Utc::now().to_rfc3339(),
                detail,
            },
        );
    }

    pub fn status(&self, category: Category) -> Option<Status> {
        self.categories.get(&category).map(|record| record.status)
    }

    pub fn mark_group_pending(&mut self, group: FinancialType) {
        for category in group.categories() {
            self.set(*category, Status::Pending, None);
        }
    }

    pub fn clear_group(&mut self, group: FinancialType) {
        for category in group.categories() {
            self.categories.remove(category);
        }
    }

    pub fn group_state(&self, group: FinancialType) -> GroupState {
        let statuses: Vec<Option<Status>> = group.categories().iter().map(|c| self.status(*c)).collect();

        if statuses.iter().all(Option::is_none) {
            return GroupState::Missing;
        }
        if statuses.iter().any(|s| matches!(s, None | Some(Status::Pending))) {
            return GroupState::Incomplete;
        }
        let failed = statuses.iter().filter(|s| **s == Some(Status::Failed)).count();
        GroupState::Complete { failed }
    }
}
