// src/utils/html_debug.rs
use std::fs;
use std::io::Write;
use std::path::Path;

use scraper::Html;

use crate::utils::error::StorageError;

/// Saves the currently loaded page with a comment banner listing what failed
/// on it, so layout changes can be diagnosed offline.
pub fn save_page_snapshot(page: &Html, path: &Path, url: &str, failures: &[String]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut banner = String::from("<!--\n");
    banner.push_str(&format!("  source: {}\n", url));
    banner.push_str(&format!("  captured: {}\n", chrono::Utc::now().to_rfc3339()));
    for failure in failures {
        // "--" would terminate the comment early
        banner.push_str(&format!("  failed: {}\n", failure.replace("--", "- -")));
    }
    banner.push_str("-->\n");

    let mut file = fs::File::create(path)?;
    file.write_all(banner.as_bytes())?;
    file.write_all(page.html().as_bytes())?;

    tracing::info!("Saved page snapshot to {}", path.display());
    Ok(())
}
