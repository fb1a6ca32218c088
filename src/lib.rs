//! Journal-Harvest: a staged crawler for journal article metrics
//!
//! This crate walks a four-level hierarchy of pages (yearly archive index,
//! issue, article, metrics) and writes one dataset row per article whose
//! metrics page could be read.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod stages;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Journal-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Extraction error for {url}: {source}")]
    Extract { url: String, source: ExtractError },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Crawl task failed: {0}")]
    Task(String),
}

impl HarvestError {
    /// Returns true if this error came from fetching rather than from handling a page
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Status { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while reading fields out of a fetched page
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Required field '{field}' is missing")]
    MissingRequiredField { field: &'static str },

    #[error("Field '{field}' has malformed number '{value}'")]
    MalformedNumber { field: &'static str, value: String },

    #[error("Invalid query '{0}'")]
    InvalidQuery(String),
}

/// Result type alias for Journal-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for extraction operations
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlTarget, Stage};
pub use storage::{ArticleRecord, UrlBatch};
