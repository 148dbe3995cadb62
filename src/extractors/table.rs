// src/extractors/table.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

use crate::extractors::dom::{child_elements, element_text};
use crate::roic::models::{MetricRow, NormalizedDataset};
use crate::utils::error::PageError;

// --- Constants ---
/// Most recent fiscal-year columns kept per table.
pub const MAX_YEARS: usize = 10;

/// Token for cells without data.
pub const ZERO_TOKEN: &str = "0";

// Header cells look like "2023 Y"; anything else (labels, "TTM") is not a year.
static YEAR_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]+)(?:\s*Y)?$").expect("Failed to compile YEAR_LABEL_RE")
});

/// Canonical token for one cell's text: thousands separators removed, the
/// no-data glyph and empty cells become `"0"`, everything else as-is.
pub fn normalize(cell_text: &str) -> String {
    let value = cell_text.trim().replace(',', "");
    match value.as_str() {
        "" | "- -" | "--" => ZERO_TOKEN.to_string(),
        _ => value,
    }
}

/// Year token of a header cell, or `None` for non-year columns.
pub fn year_label(cell_text: &str) -> Option<String> {
    YEAR_LABEL_RE
        .captures(cell_text.trim())
        .map(|caps| caps[1].to_string())
}

/// Keeps the last `keep` entries, preserving order.
fn trailing_window<T>(mut items: Vec<T>, keep: usize) -> Vec<T> {
    if items.len() > keep {
        items.drain(..items.len() - keep);
    }
    items
}

/// Extracts a table region made of exactly two child regions, header then
/// body. Each body row's first cell is the metric name.
///
/// Values are aligned to years by position: rows wider than the retained
/// years keep their trailing window (matching the header truncation), and
/// shorter rows are padded with the zero token at the end.
pub fn extract_table(table: ElementRef<'_>) -> Result<NormalizedDataset, PageError> {
    let regions = child_elements(table);
    let [header, body] = regions.as_slice() else {
        return Err(PageError::Layout(format!(
            "expected header and body regions, found {} child elements",
            regions.len()
        )));
    };

    let years: Vec<String> = child_elements(*header)
        .into_iter()
        .filter_map(|cell| year_label(&element_text(cell)))
        .collect();
    let years = trailing_window(years, MAX_YEARS);

    let mut rows = Vec::new();
    for (index, row) in child_elements(*body).into_iter().enumerate() {
        let cells = child_elements(row);
        let Some((name_cell, value_cells)) = cells.split_first() else {
            return Err(PageError::Layout(format!("body row {} has no cells", index)));
        };

        let values: Vec<String> = value_cells
            .iter()
            .map(|cell| normalize(&element_text(*cell)))
            .collect();
        let mut values = trailing_window(values, years.len());
        values.resize(years.len(), ZERO_TOKEN.to_string());

        rows.push(MetricRow {
            name: element_text(*name_cell),
            values,
        });
    }

    tracing::debug!("Extracted {} rows across {} years", rows.len(), years.len());
    Ok(NormalizedDataset { years, rows })
}
