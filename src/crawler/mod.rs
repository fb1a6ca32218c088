//! Crawler module for fetching and routing pages
//!
//! This module contains the crawl pipeline, including:
//! - Crawl targets tagged with the stage that handles them
//! - HTTP fetching and status classification
//! - The global dispatch throttle
//! - Overall crawl coordination and run statistics

mod coordinator;
mod fetcher;
mod stats;
mod target;
mod throttle;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, fetch, is_processable};
pub use stats::{print_statistics, CrawlStatistics, StageCounts};
pub use target::{CrawlTarget, RawDocument, Stage};
pub use throttle::{DispatchPermit, Throttle};
