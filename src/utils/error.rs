// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error {status} for {url}")]
    Http { status: reqwest::StatusCode, url: String },

    #[error("No page has been loaded yet")]
    NoPage,
}

/// Failures while reading a loaded page. `NotFound` and `Layout` are isolated
/// per category by the orchestrator; neither aborts the ticker.
#[derive(Error, Debug)]
pub enum PageError {
    #[error("Page driver failed: {0}")]
    Driver(#[from] DriverError),

    #[error("Region not found: {0}")]
    NotFound(String),

    #[error("Table layout mismatch: {0}")]
    Layout(String),
}

#[derive(Error, Debug)]
pub enum UniverseError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode),

    #[error("Could not read ticker file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse reference table: {0}")]
    Parse(String),

    #[error("Ticker universe is empty")]
    Empty,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Anything that stops one (ticker, group) or one category.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error(transparent)]
    Page(#[from] PageError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<DriverError> for ScrapeError {
    fn from(e: DriverError) -> Self {
        ScrapeError::Page(PageError::Driver(e))
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Ticker universe unavailable: {0}")]
    Universe(#[from] UniverseError),

    #[error("Page driver setup failed: {0}")]
    Driver(#[from] DriverError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
