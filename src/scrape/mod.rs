// src/scrape/mod.rs
pub mod report;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

use scraper::Html;
use url::Url;

use crate::config::ScrapeConfig;
use crate::extractors::{extract_table, AvailabilityClassifier, TableLocator};
use crate::roic::models::{Category, FinancialType, NormalizedDataset, Period};
use crate::roic::{Navigator, PageDriver};
use crate::storage::{same_contents, GroupState, Status, StorageManager, TickerManifest};
use crate::utils::error::{DriverError, ScrapeError};
use crate::utils::{html_debug, AppError};

pub use report::{CategoryOutcome, CategoryReport, GroupOutcome, RunReport};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Re-fetch groups whose manifest records failed categories.
    pub retry_failed: bool,
    /// Save the loaded page when a category fails on it.
    pub debug: bool,
}

enum GroupScrape {
    Unsupported,
    Scraped(Vec<CategoryReport>),
}

/// Walks tickers and groups sequentially over one driver session.
pub struct Orchestrator {
    navigator: Navigator,
    locator: TableLocator,
    availability: AvailabilityClassifier,
    storage: StorageManager,
    mirrors: BTreeMap<String, String>,
    options: RunOptions,
}

impl Orchestrator {
    pub fn new(
        navigator: Navigator,
        locator: TableLocator,
        availability: AvailabilityClassifier,
        storage: StorageManager,
        mirrors: BTreeMap<String, String>,
        options: RunOptions,
    ) -> Self {
        Self { navigator, locator, availability, storage, mirrors, options }
    }

    pub fn from_config(config: &ScrapeConfig, options: RunOptions) -> Result<Self, AppError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::Config(format!("base_url '{}': {}", config.base_url, e)))?;
        let navigator = Navigator::new(base_url, &config.navigation_selector, config.wait.policy())
            .map_err(AppError::Config)?;
        let locator = TableLocator::from_descriptors(&config.locators).map_err(AppError::Config)?;
        let unconfigured = locator.unconfigured();
        if !unconfigured.is_empty() {
            tracing::warn!("No table locator for {:?}; those categories will fail", unconfigured);
        }
        let availability = AvailabilityClassifier::new(&config.navigation_selector).map_err(AppError::Config)?;
        let storage = StorageManager::new(&config.output_dir)?;

        Ok(Self::new(navigator, locator, availability, storage, config.mirrors.clone(), options))
    }

    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    /// Scrapes every (ticker, group) pair not already on disk. Failures are
    /// contained per category or per group and end up in the report.
    pub async fn run<D: PageDriver>(
        &self,
        driver: &mut D,
        tickers: &[String],
        period: Period,
        groups: &[FinancialType],
    ) -> RunReport {
        let mut report = RunReport::default();

        // Mirrors whose primary is part of this run are filled from the
        // primary's output instead of being fetched.
        let in_run: HashSet<&str> = tickers.iter().map(String::as_str).collect();
        let copied_from: HashMap<&str, &str> = self
            .mirrors
            .iter()
            .filter(|(primary, _)| in_run.contains(primary.as_str()))
            .map(|(primary, mirror)| (mirror.as_str(), primary.as_str()))
            .collect();

        let mut deferred = Vec::new();
        for (index, ticker) in tickers.iter().enumerate() {
            tracing::info!("[{}/{}] Processing {}", index + 1, tickers.len(), ticker);

            if let Some(primary) = copied_from.get(ticker.as_str()) {
                tracing::info!("{} is mirrored from {}, settling it after the primaries", ticker, primary);
                deferred.push((ticker.as_str(), *primary));
                continue;
            }

            self.scrape_ticker(driver, ticker, period, groups, &mut report).await;
        }

        for (mirror, primary) in deferred {
            self.settle_mirror(driver, mirror, primary, period, groups, &mut report).await;
        }

        let summary = report.summary;
        tracing::info!(
            "Run finished. Written: {}, Failed: {}, Resumed: {}, Unsupported: {}, Group failures: {}, Mirrored files: {}",
            summary.written, summary.failed, summary.resumed, summary.unsupported, summary.group_failures, summary.mirrored_files
        );
        report
    }

    async fn scrape_ticker<D: PageDriver>(
        &self,
        driver: &mut D,
        ticker: &str,
        period: Period,
        groups: &[FinancialType],
        report: &mut RunReport,
    ) {
        let mut manifest = match self.storage.load_manifest(ticker) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::error!(ticker = %ticker, "Failed to read manifest: {}", e);
                for group in groups {
                    report.push(ticker, *group, GroupOutcome::Failed { reason: e.to_string() });
                }
                return;
            }
        };

        if manifest.unsupported {
            tracing::info!("Skipping {}: previously found unsupported by the site", ticker);
            for group in groups {
                report.push(ticker, *group, GroupOutcome::Unsupported);
            }
            return;
        }

        for (position, group) in groups.iter().enumerate() {
            if self.storage.is_group_scraped(&manifest, *group, self.options.retry_failed) {
                tracing::info!("Skipping {} {}: already scraped", ticker, group);
                report.push(ticker, *group, GroupOutcome::AlreadyScraped);
                // An earlier run may have stopped before the mirror got its copy.
                self.sync_mirror(&manifest, *group, report);
                continue;
            }

            match self.scrape_group(driver, &mut manifest, ticker, *group, period).await {
                Ok(GroupScrape::Unsupported) => {
                    tracing::info!("Skipping {}: not supported by the site", ticker);
                    for remaining in &groups[position..] {
                        report.push(ticker, *remaining, GroupOutcome::Unsupported);
                    }
                    return;
                }
                Ok(GroupScrape::Scraped(categories)) => {
                    report.push(ticker, *group, GroupOutcome::Scraped { categories });
                    self.sync_mirror(&manifest, *group, report);
                }
                Err(e) => {
                    tracing::error!(ticker = %ticker, group = %group, "Group failed: {}", e);
                    report.push(ticker, *group, GroupOutcome::Failed { reason: e.to_string() });
                }
            }
        }
    }

    async fn scrape_group<D: PageDriver>(
        &self,
        driver: &mut D,
        manifest: &mut TickerManifest,
        ticker: &str,
        group: FinancialType,
        period: Period,
    ) -> Result<GroupScrape, ScrapeError> {
        // 1. Load the group page and wait for its tab region
        let url = self.navigator.build_url(ticker, group, period);
        self.navigator.load(driver, &url).await?;
        let page = driver.page().ok_or(DriverError::NoPage)?;

        // 2. Placeholder instead of tabs: the site does not cover this ticker
        if !self.availability.is_supported(page)? {
            manifest.clear_group(group);
            manifest.unsupported = true;
            self.storage.save_manifest(manifest)?;
            return Ok(GroupScrape::Unsupported);
        }

        // Pending entries mark the group as in progress until the final save.
        manifest.mark_group_pending(group);
        self.storage.save_manifest(manifest)?;

        // 3. Extract every category from the same page; failures stay per category
        let mut categories = Vec::new();
        let mut failures = Vec::new();
        for category in group.categories() {
            let outcome = match self.scrape_category(page, ticker, *category) {
                Ok(path) => {
                    manifest.set(*category, Status::Done, None);
                    CategoryOutcome::Written { path }
                }
                Err(e) => {
                    tracing::error!(ticker = %ticker, group = %group, category = %category, "Failed to scrape table: {}", e);
                    manifest.set(*category, Status::Failed, Some(e.to_string()));
                    failures.push(format!("{}: {}", category, e));
                    CategoryOutcome::Failed { reason: e.to_string() }
                }
            };
            categories.push(CategoryReport { category: *category, outcome });
        }

        // 4. Keep the page for inspection when something failed on it
        if self.options.debug && !failures.is_empty() {
            let path = self.storage.snapshot_path(ticker, group);
            if let Err(e) = html_debug::save_page_snapshot(page, &path, url.as_str(), &failures) {
                tracing::warn!("Failed to save page snapshot: {}", e);
            }
        }

        // 5. Final statuses replace the pending markers
        self.storage.save_manifest(manifest)?;
        Ok(GroupScrape::Scraped(categories))
    }

    fn scrape_category(&self, page: &Html, ticker: &str, category: Category) -> Result<PathBuf, ScrapeError> {
        let region = self.locator.locate(page, category)?;
        let dataset: NormalizedDataset = extract_table(region)?;
        Ok(self.storage.save_dataset(ticker, category, &dataset)?)
    }

    /// Reports the mirror's groups that are complete after the primaries ran
    /// as mirrored, and fetches the rest under the mirror's own symbol.
    async fn settle_mirror<D: PageDriver>(
        &self,
        driver: &mut D,
        mirror: &str,
        primary: &str,
        period: Period,
        groups: &[FinancialType],
        report: &mut RunReport,
    ) {
        let manifest = match self.storage.load_manifest(mirror) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!(ticker = %mirror, "Failed to read mirror manifest: {}", e);
                TickerManifest::new(mirror)
            }
        };

        let mut unresolved = Vec::new();
        for group in groups {
            if matches!(manifest.group_state(*group), GroupState::Complete { .. }) {
                report.push(mirror, *group, GroupOutcome::Mirrored { primary: primary.to_string() });
            } else {
                unresolved.push(*group);
            }
        }

        if !unresolved.is_empty() {
            tracing::info!("{} did not supply {} {:?}, fetching it directly", primary, mirror, unresolved);
            self.scrape_ticker(driver, mirror, period, &unresolved, report).await;
        }
    }

    /// Brings the mirror of `primary` (if any) up to date for one group:
    /// tables missing or stale under the mirror are copied byte-for-byte and
    /// the mirror's manifest takes the primary's statuses.
    fn sync_mirror(&self, primary: &TickerManifest, group: FinancialType, report: &mut RunReport) {
        let Some(mirror) = self.mirrors.get(&primary.ticker) else {
            return;
        };
        let mut manifest = match self.storage.load_manifest(mirror) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::error!(ticker = %mirror, "Failed to read mirror manifest: {}", e);
                return;
            }
        };

        let mut copied = 0;
        let mut changed = false;
        for category in group.categories() {
            let record = primary.categories.get(category);
            match record.map(|r| r.status) {
                Some(Status::Pending) => {}
                Some(Status::Failed) => {
                    if manifest.status(*category) != Some(Status::Failed) {
                        manifest.set(*category, Status::Failed, record.and_then(|r| r.detail.clone()));
                        changed = true;
                    }
                }
                // Done, or written before manifests existed.
                Some(Status::Done) | None => {
                    let source = self.storage.dataset_path(&primary.ticker, *category);
                    if !source.is_file() {
                        continue;
                    }
                    let target = self.storage.dataset_path(mirror, *category);
                    if manifest.status(*category) == Some(Status::Done) && same_contents(&source, &target) {
                        continue;
                    }
                    match self.storage.mirror_dataset(&source, mirror, *category) {
                        Ok(_) => {
                            manifest.set(*category, Status::Done, None);
                            copied += 1;
                        }
                        Err(e) => {
                            tracing::error!(ticker = %mirror, category = %category, "Failed to mirror {}: {}", primary.ticker, e);
                            manifest.set(*category, Status::Failed, Some(e.to_string()));
                        }
                    }
                    changed = true;
                }
            }
        }

        if changed {
            if let Err(e) = self.storage.save_manifest(&manifest) {
                tracing::error!(ticker = %mirror, "Failed to save mirror manifest: {}", e);
            }
        }
        report.record_mirrored(copied);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{group_page, table, unsupported_page, FakeDriver, SITE_BASE};
    use std::fs;
    use std::path::Path;

    fn test_config(output: &Path) -> ScrapeConfig {
        let mut config = ScrapeConfig::default();
        config.base_url = SITE_BASE.to_string();
        config.output_dir = output.to_path_buf();
        config.wait.timeout_ms = 20;
        config.wait.poll_interval_ms = 5;
        config
    }

    fn orchestrator(output: &Path, options: RunOptions) -> Orchestrator {
        Orchestrator::from_config(&test_config(output), options).unwrap()
    }

    fn without_mirrors(output: &Path) -> Orchestrator {
        let mut config = test_config(output);
        config.mirrors.clear();
        Orchestrator::from_config(&config, RunOptions::default()).unwrap()
    }

    fn url(ticker: &str, group: &str) -> String {
        format!("{}/{}/{}?fs=annual", SITE_BASE, group, ticker)
    }

    fn income_table() -> String {
        table(&["", "2023 Y", "2022 Y", "TTM"], &[&["Revenue", "394,328", "- -"]])
    }

    fn financials_page() -> String {
        let simple = table(&["", "2023 Y"], &[&["Total assets", "352,583"]]);
        group_page(
            FinancialType::Financials,
            &[
                (Category::Income, income_table()),
                (Category::BalanceSheet, simple.clone()),
                (Category::CashFlow, simple),
            ],
        )
    }

    fn ratios_page() -> String {
        let tables: Vec<(Category, String)> = FinancialType::Ratios
            .categories()
            .iter()
            .map(|c| (*c, table(&["", "2023 Y", "2022 Y"], &[&["Metric", "1.5", "-0.2"]])))
            .collect();
        group_page(FinancialType::Ratios, &tables)
    }

    fn tickers(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn writes_normalized_csv_per_category() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), RunOptions::default());
        let mut driver = FakeDriver::default();
        driver.add_page(&url("AAPL", "financials"), &financials_page());

        let report = orch
            .run(&mut driver, &tickers(&["AAPL"]), Period::Annual, &[FinancialType::Financials])
            .await;

        assert_eq!(report.summary.written, 3);
        assert_eq!(report.summary.failed, 0);
        let income = fs::read_to_string(dir.path().join("AAPL/financials/income.csv")).unwrap();
        assert_eq!(income, ",2023,2022\nRevenue,394328,0\n");
        let balance = fs::read_to_string(dir.path().join("AAPL/financials/balance_sheet.csv")).unwrap();
        assert_eq!(balance, ",2023\nTotal assets,352583\n");

        let manifest = orch.storage().load_manifest("AAPL").unwrap();
        assert_eq!(manifest.status(Category::CashFlow), Some(Status::Done));
    }

    #[tokio::test]
    async fn second_run_fetches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), RunOptions::default());
        let mut driver = FakeDriver::default();
        driver.add_page(&url("AAPL", "financials"), &financials_page());
        driver.add_page(&url("AAPL", "ratios"), &ratios_page());
        let symbols = tickers(&["AAPL"]);

        orch.run(&mut driver, &symbols, Period::Annual, &FinancialType::ALL).await;
        assert_eq!(driver.navigations(), 2);
        let before = fs::read(dir.path().join("AAPL/ratios/credit.csv")).unwrap();

        let report = orch.run(&mut driver, &symbols, Period::Annual, &FinancialType::ALL).await;
        assert_eq!(driver.navigations(), 2);
        assert_eq!(report.summary.resumed, 2);
        assert_eq!(report.summary.written, 0);
        assert_eq!(fs::read(dir.path().join("AAPL/ratios/credit.csv")).unwrap(), before);
    }

    #[tokio::test]
    async fn existing_group_directory_is_not_refetched() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("MSFT/financials")).unwrap();
        let orch = orchestrator(dir.path(), RunOptions::default());
        let mut driver = FakeDriver::default();
        driver.add_page(&url("MSFT", "ratios"), &ratios_page());

        let report = orch
            .run(&mut driver, &tickers(&["MSFT"]), Period::Annual, &FinancialType::ALL)
            .await;

        assert_eq!(driver.visited(), &[url("MSFT", "ratios")]);
        assert_eq!(report.outcome("MSFT", FinancialType::Financials), Some(&GroupOutcome::AlreadyScraped));
        assert!(fs::read_dir(dir.path().join("MSFT/financials")).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn interrupted_group_is_fetched_again() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), RunOptions::default());
        let mut manifest = TickerManifest::new("AAPL");
        manifest.mark_group_pending(FinancialType::Financials);
        manifest.set(Category::Income, Status::Done, None);
        orch.storage().save_manifest(&manifest).unwrap();
        fs::create_dir_all(dir.path().join("AAPL/financials")).unwrap();

        let mut driver = FakeDriver::default();
        driver.add_page(&url("AAPL", "financials"), &financials_page());
        let report = orch
            .run(&mut driver, &tickers(&["AAPL"]), Period::Annual, &[FinancialType::Financials])
            .await;

        assert_eq!(driver.navigations(), 1);
        assert_eq!(report.summary.written, 3);
    }

    #[tokio::test]
    async fn mirror_receives_identical_files() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), RunOptions::default());
        let mut driver = FakeDriver::default();
        driver.add_page(&url("GOOGL", "financials"), &financials_page());
        driver.add_page(&url("GOOGL", "ratios"), &ratios_page());

        let report = orch
            .run(&mut driver, &tickers(&["GOOG", "GOOGL"]), Period::Annual, &FinancialType::ALL)
            .await;

        assert!(driver.visited().iter().all(|u| u.contains("/GOOGL?")));
        assert_eq!(report.summary.mirrored_files, 10);
        assert_eq!(
            report.outcome("GOOG", FinancialType::Ratios),
            Some(&GroupOutcome::Mirrored { primary: "GOOGL".into() })
        );
        for category in Category::ALL {
            let group = category.financial_type().as_str();
            let name = format!("{}.csv", category.as_str());
            let primary = fs::read(dir.path().join("GOOGL").join(group).join(&name)).unwrap();
            let mirror = fs::read(dir.path().join("GOOG").join(group).join(&name)).unwrap();
            assert_eq!(primary, mirror, "{category}");
        }

        // The mirror is complete on disk, so a later run with only GOOG fetches nothing.
        let report = orch.run(&mut driver, &tickers(&["GOOG"]), Period::Annual, &FinancialType::ALL).await;
        assert_eq!(report.summary.resumed, 2);
        assert_eq!(driver.navigations(), 2);
    }

    #[tokio::test]
    async fn mirror_added_later_is_filled_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut driver = FakeDriver::default();
        driver.add_page(&url("GOOGL", "financials"), &financials_page());
        let financials = [FinancialType::Financials];

        without_mirrors(dir.path())
            .run(&mut driver, &tickers(&["GOOGL"]), Period::Annual, &financials)
            .await;
        assert!(!dir.path().join("GOOG").exists());

        let orch = orchestrator(dir.path(), RunOptions::default());
        let report = orch
            .run(&mut driver, &tickers(&["GOOGL", "GOOG"]), Period::Annual, &financials)
            .await;

        assert_eq!(driver.navigations(), 1);
        assert_eq!(report.outcome("GOOGL", FinancialType::Financials), Some(&GroupOutcome::AlreadyScraped));
        assert_eq!(
            report.outcome("GOOG", FinancialType::Financials),
            Some(&GroupOutcome::Mirrored { primary: "GOOGL".into() })
        );
        assert_eq!(report.summary.mirrored_files, 3);
        for category in FinancialType::Financials.categories() {
            let name = format!("{}.csv", category.as_str());
            let primary = fs::read(dir.path().join("GOOGL/financials").join(&name)).unwrap();
            let mirror = fs::read(dir.path().join("GOOG/financials").join(&name)).unwrap();
            assert_eq!(primary, mirror, "{category}");
        }
        assert_eq!(orch.storage().load_manifest("GOOG").unwrap().status(Category::Income), Some(Status::Done));

        // Up to date now: nothing copied again.
        let report = orch
            .run(&mut driver, &tickers(&["GOOGL", "GOOG"]), Period::Annual, &financials)
            .await;
        assert_eq!(report.summary.mirrored_files, 0);
        assert_eq!(driver.navigations(), 1);
    }

    #[tokio::test]
    async fn mirror_is_fetched_directly_when_primary_fails() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), RunOptions::default());
        let mut driver = FakeDriver::default();
        driver.add_page(&url("GOOG", "financials"), &financials_page());

        let report = orch
            .run(&mut driver, &tickers(&["GOOG", "GOOGL"]), Period::Annual, &[FinancialType::Financials])
            .await;

        assert!(matches!(
            report.outcome("GOOGL", FinancialType::Financials),
            Some(GroupOutcome::Failed { .. })
        ));
        assert!(matches!(
            report.outcome("GOOG", FinancialType::Financials),
            Some(GroupOutcome::Scraped { .. })
        ));
        assert_eq!(driver.visited().last(), Some(&url("GOOG", "financials")));
        assert!(dir.path().join("GOOG/financials/income.csv").exists());
        assert_eq!(report.summary.mirrored_files, 0);
    }

    #[tokio::test]
    async fn unsupported_ticker_skips_remaining_groups() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), RunOptions::default());
        let mut driver = FakeDriver::default();
        driver.add_page(&url("SHEL", "financials"), &unsupported_page());
        driver.add_page(&url("AAPL", "financials"), &financials_page());

        let report = orch
            .run(&mut driver, &tickers(&["SHEL", "AAPL"]), Period::Annual, &FinancialType::ALL)
            .await;

        assert_eq!(driver.visited()[0], url("SHEL", "financials"));
        assert!(!driver.visited().contains(&url("SHEL", "ratios")));
        assert_eq!(report.outcome("SHEL", FinancialType::Ratios), Some(&GroupOutcome::Unsupported));
        assert!(!dir.path().join("SHEL/financials").exists());
        assert!(!dir.path().join("SHEL/ratios").exists());
        assert!(orch.storage().load_manifest("SHEL").unwrap().unsupported);
        assert!(dir.path().join("AAPL/financials/income.csv").exists());

        let before = driver.navigations();
        orch.run(&mut driver, &tickers(&["SHEL"]), Period::Annual, &FinancialType::ALL).await;
        assert_eq!(driver.navigations(), before);
    }

    #[tokio::test]
    async fn category_failures_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), RunOptions { retry_failed: false, debug: true });
        let broken = "<div><div><div>2023 Y</div></div></div>".to_string();
        let page = group_page(
            FinancialType::Financials,
            &[(Category::Income, broken), (Category::CashFlow, income_table())],
        );
        let mut driver = FakeDriver::default();
        driver.add_page(&url("AAPL", "financials"), &page);
        driver.add_page(&url("AAPL", "ratios"), &ratios_page());

        let report = orch
            .run(&mut driver, &tickers(&["AAPL"]), Period::Annual, &FinancialType::ALL)
            .await;

        assert_eq!(report.summary.written, 1 + 7);
        assert_eq!(report.summary.failed, 2);
        assert!(dir.path().join("AAPL/financials/cash_flow.csv").exists());
        assert!(!dir.path().join("AAPL/financials/income.csv").exists());

        let manifest = orch.storage().load_manifest("AAPL").unwrap();
        assert_eq!(manifest.status(Category::Income), Some(Status::Failed));
        assert_eq!(manifest.status(Category::BalanceSheet), Some(Status::Failed));

        let snapshot = fs::read_to_string(dir.path().join("AAPL/debug/financials.html")).unwrap();
        assert!(snapshot.contains("failed: income: Table layout mismatch"));
        assert!(snapshot.contains("failed: balance_sheet: Region not found"));
    }

    #[tokio::test]
    async fn retry_failed_refetches_only_groups_with_failures() {
        let dir = tempfile::tempdir().unwrap();
        let page = group_page(FinancialType::Financials, &[(Category::Income, income_table())]);
        let mut driver = FakeDriver::default();
        driver.add_page(&url("AAPL", "financials"), &page);
        driver.add_page(&url("AAPL", "ratios"), &ratios_page());
        let symbols = tickers(&["AAPL"]);

        orchestrator(dir.path(), RunOptions::default())
            .run(&mut driver, &symbols, Period::Annual, &FinancialType::ALL)
            .await;
        assert_eq!(driver.navigations(), 2);

        driver.add_page(&url("AAPL", "financials"), &financials_page());
        let report = orchestrator(dir.path(), RunOptions { retry_failed: true, debug: false })
            .run(&mut driver, &symbols, Period::Annual, &FinancialType::ALL)
            .await;

        assert_eq!(driver.navigations(), 3);
        assert_eq!(report.summary.written, 3);
        assert_eq!(report.outcome("AAPL", FinancialType::Ratios), Some(&GroupOutcome::AlreadyScraped));
    }

    #[tokio::test]
    async fn navigation_failure_moves_on_and_retries_later() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), RunOptions::default());
        let mut driver = FakeDriver::default();
        driver.add_page(&url("MSFT", "financials"), &financials_page());

        let report = orch
            .run(&mut driver, &tickers(&["NOPE", "MSFT"]), Period::Annual, &[FinancialType::Financials])
            .await;

        assert!(matches!(
            report.outcome("NOPE", FinancialType::Financials),
            Some(GroupOutcome::Failed { .. })
        ));
        assert_eq!(report.summary.group_failures, 1);
        assert_eq!(report.summary.written, 3);

        orch.run(&mut driver, &tickers(&["NOPE"]), Period::Annual, &[FinancialType::Financials]).await;
        assert_eq!(driver.visited().last(), Some(&url("NOPE", "financials")));
    }

    #[tokio::test]
    async fn page_that_never_renders_is_a_group_failure() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(dir.path(), RunOptions::default());
        let mut driver = FakeDriver::default();
        driver.add_page(&url("AAPL", "financials"), "<html><body><p>Loading…</p></body></html>");

        let report = orch
            .run(&mut driver, &tickers(&["AAPL"]), Period::Annual, &[FinancialType::Financials])
            .await;

        match report.outcome("AAPL", FinancialType::Financials) {
            Some(GroupOutcome::Failed { reason }) => assert!(reason.contains("did not appear"), "{reason}"),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(driver.refreshes() > 0);
    }
}
