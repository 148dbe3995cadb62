// src/extractors/mod.rs
pub mod availability;
pub mod dom;
pub mod locator;
pub mod table;

// Re-export key extraction types for convenience
pub use availability::AvailabilityClassifier;
pub use locator::TableLocator;
pub use table::extract_table;
