//! Storage module for persisting harvest output
//!
//! This module handles every file the crawler writes:
//! - The append-only article dataset
//! - One audit file per link-discovering stage

mod csv_sink;
mod record;
mod traits;

pub use csv_sink::CsvSink;
pub use record::{ArticleRecord, TweetCount, UrlBatch, DATASET_COLUMNS};
pub use traits::{Sink, StorageError, StorageResult};
