// src/config.rs
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::roic::models::{Category, FinancialType, Period};
use crate::roic::WaitPolicy;
use crate::universe::UniverseSource;
use crate::utils::AppError;

pub const DEFAULT_BASE_URL: &str = "https://roic.ai";

// Content column of the rendered page: the tab bar comes first, then one
// section per category in tab order.
const PAGE_ROOT: &str = "body > div:nth-of-type(1) > div:nth-of-type(2) > div:nth-of-type(2)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self { timeout_ms: 15_000, poll_interval_ms: 500 }
    }
}

impl WaitConfig {
    pub fn policy(&self) -> WaitPolicy {
        WaitPolicy {
            timeout: Duration::from_millis(self.timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

/// Everything a run needs. Loaded from an optional JSON file; CLI flags
/// override individual fields afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub period: Period,
    pub output_dir: PathBuf,
    pub groups: Vec<FinancialType>,
    /// Primary symbol -> symbol that shares its financials.
    pub mirrors: BTreeMap<String, String>,
    pub universe: UniverseSource,
    /// Category -> position descriptor (CSS path) of its table.
    pub locators: BTreeMap<Category, String>,
    /// Region holding the category tabs; also the page-ready signal.
    pub navigation_selector: String,
    pub wait: WaitConfig,
    pub request_timeout_secs: u64,
    pub render_proxy: Option<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            period: Period::Annual,
            output_dir: PathBuf::from("output"),
            groups: FinancialType::ALL.to_vec(),
            mirrors: BTreeMap::from([("GOOGL".to_string(), "GOOG".to_string())]),
            universe: UniverseSource::default(),
            locators: default_locators(),
            navigation_selector: format!("{} > div:nth-of-type(1)", PAGE_ROOT),
            wait: WaitConfig::default(),
            request_timeout_secs: 30,
            render_proxy: None,
        }
    }
}

/// Table positions as laid out on the site's group pages.
pub fn default_locators() -> BTreeMap<Category, String> {
    let mut locators = BTreeMap::new();
    for group in FinancialType::ALL {
        for (index, category) in group.categories().iter().enumerate() {
            locators.insert(
                *category,
                format!("{} > div:nth-of-type({}) > div > div", PAGE_ROOT, index + 2),
            );
        }
    }
    locators
}

impl ScrapeConfig {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: ScrapeConfig = serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;

        // A partial `locators` table overrides the defaults per category.
        let mut locators = default_locators();
        locators.append(&mut config.locators);
        config.locators = locators;

        // Symbols are upper-case everywhere else; keys must match them
        config.mirrors = normalize_mirrors(std::mem::take(&mut config.mirrors))
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Trimmed, upper-cased pair; `None` when a side is empty or both name the
/// same symbol.
fn mirror_pair(primary: &str, mirror: &str) -> Option<(String, String)> {
    let (primary, mirror) = (primary.trim().to_uppercase(), mirror.trim().to_uppercase());
    if primary.is_empty() || mirror.is_empty() || primary == mirror {
        return None;
    }
    Some((primary, mirror))
}

/// Parses a `PRIMARY=MIRROR` CLI pair.
pub fn parse_mirror(pair: &str) -> Result<(String, String), String> {
    let (primary, mirror) = pair
        .split_once('=')
        .ok_or_else(|| format!("expected PRIMARY=MIRROR, got '{}'", pair))?;
    mirror_pair(primary, mirror).ok_or_else(|| format!("invalid mirror pair '{}'", pair))
}

fn normalize_mirrors(mirrors: BTreeMap<String, String>) -> Result<BTreeMap<String, String>, String> {
    mirrors
        .iter()
        .map(|(primary, mirror)| {
            mirror_pair(primary, mirror).ok_or_else(|| format!("invalid mirror pair '{}={}'", primary, mirror))
        })
        .collect()
}
