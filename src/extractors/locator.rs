// src/extractors/locator.rs
use std::collections::{BTreeMap, HashMap};

use scraper::{ElementRef, Html, Selector};

use crate::roic::models::Category;
use crate::utils::error::PageError;

/// Finds one category's table region on a loaded page.
pub trait TableLocatorStrategy {
    fn locate<'a>(&self, page: &'a Html) -> Option<ElementRef<'a>>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

/// Locates a table by a structural CSS path; the first match wins.
pub struct PositionStrategy {
    descriptor: String,
    selector: Selector,
}

impl PositionStrategy {
    pub fn new(descriptor: &str) -> Result<Self, String> {
        let selector = Selector::parse(descriptor)
            .map_err(|e| format!("invalid position descriptor '{}': {}", descriptor, e))?;
        Ok(Self { descriptor: descriptor.to_string(), selector })
    }
}

impl TableLocatorStrategy for PositionStrategy {
    fn locate<'a>(&self, page: &'a Html) -> Option<ElementRef<'a>> {
        page.select(&self.selector).next()
    }

    fn describe(&self) -> String {
        self.descriptor.clone()
    }
}

/// Category to strategy mapping, built once from configuration.
pub struct TableLocator {
    strategies: HashMap<Category, Box<dyn TableLocatorStrategy>>,
}

impl TableLocator {
    pub fn new(strategies: HashMap<Category, Box<dyn TableLocatorStrategy>>) -> Self {
        Self { strategies }
    }

    /// Builds position strategies from `category -> descriptor` pairs.
    pub fn from_descriptors(descriptors: &BTreeMap<Category, String>) -> Result<Self, String> {
        let mut strategies: HashMap<Category, Box<dyn TableLocatorStrategy>> = HashMap::new();
        for (category, descriptor) in descriptors {
            let strategy = PositionStrategy::new(descriptor)
                .map_err(|e| format!("{}: {}", category, e))?;
            strategies.insert(*category, Box::new(strategy));
        }
        Ok(Self::new(strategies))
    }

    /// Categories with no strategy; their tables always come back `NotFound`.
    pub fn unconfigured(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|category| !self.strategies.contains_key(category))
            .collect()
    }

    pub fn locate<'a>(&self, page: &'a Html, category: Category) -> Result<ElementRef<'a>, PageError> {
        let strategy = self
            .strategies
            .get(&category)
            .ok_or_else(|| PageError::NotFound(format!("no locator configured for {}", category)))?;

        strategy.locate(page).ok_or_else(|| {
            PageError::NotFound(format!("{} table not at '{}'", category, strategy.describe()))
        })
    }
}
