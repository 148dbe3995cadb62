// src/storage/mod.rs
pub mod manifest;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::roic::models::{Category, FinancialType, NormalizedDataset};
use crate::utils::error::StorageError;

pub use manifest::{GroupState, Status, TickerManifest};

const MANIFEST_FILE: &str = "manifest.json";
const REPORT_FILE: &str = "run_report.json";

/// Owns the output tree: `<base>/<ticker>/<financial_type>/<category>.csv`
/// plus one manifest per ticker.
pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn ticker_dir(&self, ticker: &str) -> PathBuf {
        self.base_dir.join(ticker)
    }

    pub fn group_dir(&self, ticker: &str, group: FinancialType) -> PathBuf {
        self.ticker_dir(ticker).join(group.as_str())
    }

    pub fn dataset_path(&self, ticker: &str, category: Category) -> PathBuf {
        self.group_dir(ticker, category.financial_type())
            .join(format!("{}.csv", category.as_str()))
    }

    pub fn snapshot_path(&self, ticker: &str, group: FinancialType) -> PathBuf {
        self.ticker_dir(ticker)
            .join("debug")
            .join(format!("{}.html", group.as_str()))
    }

    fn manifest_path(&self, ticker: &str) -> PathBuf {
        self.ticker_dir(ticker).join(MANIFEST_FILE)
    }

    /// Loads the ticker's manifest, or an empty one if none was written yet.
    pub fn load_manifest(&self, ticker: &str) -> Result<TickerManifest, StorageError> {
        let path = self.manifest_path(ticker);
        // Nothing recorded yet for this ticker
        if !path.exists() {
            return Ok(TickerManifest::new(ticker));
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_manifest(&self, manifest: &TickerManifest) -> Result<PathBuf, StorageError> {
        let path = self.manifest_path(&manifest.ticker);
        let content = serde_json::to_string_pretty(manifest)?;
        write_atomic(&path, content.as_bytes())?;
        tracing::debug!("Saved manifest to {}", path.display());
        Ok(path)
    }

    /// Whether a group needs no fetch this run. Output written before
    /// manifests existed still counts: a group directory without any
    /// manifest entry is treated as done.
    pub fn is_group_scraped(&self, manifest: &TickerManifest, group: FinancialType, retry_failed: bool) -> bool {
        match manifest.group_state(group) {
            GroupState::Complete { failed } => !(retry_failed && failed > 0),
            GroupState::Incomplete => false,
            GroupState::Missing => self.group_dir(&manifest.ticker, group).is_dir(),
        }
    }

    /// Writes one category table as CSV: a header of `""` followed by the
    /// year labels, then one line per metric.
    pub fn save_dataset(&self, ticker: &str, category: Category, dataset: &NormalizedDataset) -> Result<PathBuf, StorageError> {
        // Header row: empty name column, then the year labels
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(std::iter::once("").chain(dataset.years.iter().map(String::as_str)))?;

        // One record per metric; the writer quotes names containing commas
        for row in &dataset.rows {
            writer.write_record(std::iter::once(row.name.as_str()).chain(row.values.iter().map(String::as_str)))?;
        }
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;

        // Replace any earlier copy in one step
        let path = self.dataset_path(ticker, category);
        write_atomic(&path, &bytes)?;
        tracing::info!("Saved {} rows to {}", dataset.rows.len(), path.display());
        Ok(path)
    }

    /// Copies an already written dataset byte-for-byte under another ticker.
    pub fn mirror_dataset(&self, source: &Path, mirror: &str, category: Category) -> Result<PathBuf, StorageError> {
        let bytes = fs::read(source)?;
        let path = self.dataset_path(mirror, category);
        write_atomic(&path, &bytes)?;
        tracing::info!("Mirrored {} to {}", source.display(), path.display());
        Ok(path)
    }

    pub fn save_report<T: Serialize>(&self, report: &T) -> Result<PathBuf, StorageError> {
        let path = self.base_dir.join(REPORT_FILE);
        let content = serde_json::to_string_pretty(report)?;
        write_atomic(&path, content.as_bytes())?;
        Ok(path)
    }
}

/// Writes to a temporary sibling and renames it into place, so readers never
/// see a half-written file.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    // Create the directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Temporary file next to the target, so the rename stays on one filesystem
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, bytes)?;
    // Rename over the target (replaces an existing file)
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Whether both files can be read and hold the same bytes.
pub fn same_contents(a: &Path, b: &Path) -> bool {
    match (fs::read(a), fs::read(b)) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}
