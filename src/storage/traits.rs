//! Sink trait and error types
//!
//! A sink is the durable, append-only destination for finished records and
//! for the per-stage link audit.

use crate::crawler::Stage;
use crate::storage::{ArticleRecord, UrlBatch};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: String,
        source: csv::Error,
    },

    #[error("Writer lock poisoned for {0}")]
    Poisoned(String),

    #[error("No audit file for stage {0:?}")]
    NoAuditFile(Stage),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for persistence backends
///
/// Implementations are shared by every in-flight page, so each method must
/// serialize writes per destination: a row is either fully written or not at
/// all, and rows never interleave.
pub trait Sink: Send + Sync {
    /// Appends one finished record to the dataset
    fn append(&self, record: &ArticleRecord) -> StorageResult<()>;

    /// Persists the links one page of `stage` discovered
    ///
    /// The index stage has a single page, so its audit file is overwritten;
    /// the issue and article stages append one row per page.
    fn append_batch(&self, stage: Stage, batch: &UrlBatch) -> StorageResult<()>;
}
