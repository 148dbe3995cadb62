// src/extractors/availability.rs
use scraper::{Html, Selector};

use crate::extractors::dom::child_elements;
use crate::utils::error::PageError;

/// Tells supported tickers from those the site renders a placeholder for
/// (typically non-domestic listings).
pub struct AvailabilityClassifier {
    descriptor: String,
    navigation: Selector,
}

impl AvailabilityClassifier {
    pub fn new(navigation_descriptor: &str) -> Result<Self, String> {
        let navigation = Selector::parse(navigation_descriptor)
            .map_err(|e| format!("invalid navigation descriptor '{}': {}", navigation_descriptor, e))?;
        Ok(Self { descriptor: navigation_descriptor.to_string(), navigation })
    }

    /// The tab navigation region normally holds one entry per category; a
    /// single child there is the "not supported" placeholder.
    pub fn is_supported(&self, page: &Html) -> Result<bool, PageError> {
        let region = page
            .select(&self.navigation)
            .next()
            .ok_or_else(|| PageError::NotFound(format!("navigation region '{}'", self.descriptor)))?;

        Ok(child_elements(region).len() != 1)
    }
}
