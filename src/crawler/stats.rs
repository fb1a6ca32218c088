//! Run statistics
//!
//! Counters the coordinator updates as targets complete, printed at the end
//! of a run.

use crate::crawler::Stage;
use std::collections::HashMap;

/// Per-stage counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageCounts {
    /// Targets handed to the throttle
    pub dispatched: u64,
    /// Targets whose handler returned an outcome
    pub succeeded: u64,
    /// Targets abandoned after a fetch failure
    pub fetch_failures: u64,
    /// Targets abandoned after an extraction or persistence failure
    pub page_failures: u64,
    /// Succeeded pages that yielded nothing to follow
    pub dead_branches: u64,
}

impl StageCounts {
    pub fn failed(&self) -> u64 {
        self.fetch_failures + self.page_failures
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Counters keyed by stage
    pub stages: HashMap<Stage, StageCounts>,

    /// Records appended to the dataset
    pub records_written: u64,

    /// Tasks that panicked or were cancelled
    pub aborted_tasks: u64,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters for one stage (zeroes if nothing ran at that stage)
    pub fn stage(&self, stage: Stage) -> StageCounts {
        self.stages.get(&stage).copied().unwrap_or_default()
    }

    pub(crate) fn stage_mut(&mut self, stage: Stage) -> &mut StageCounts {
        self.stages.entry(stage).or_default()
    }

    pub fn total_dispatched(&self) -> u64 {
        self.stages.values().map(|c| c.dispatched).sum()
    }

    pub fn total_failed(&self) -> u64 {
        self.stages.values().map(|c| c.failed()).sum()
    }

    /// Articles that had no metrics link
    pub fn dropped_articles(&self) -> u64 {
        self.stage(Stage::Article).dead_branches
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!(
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Stage", "Dispatched", "Succeeded", "Fetch err", "Page err", "Dead"
    );
    for stage in Stage::ALL {
        let counts = stats.stage(stage);
        println!(
            "{:<10} {:>10} {:>10} {:>10} {:>10} {:>10}",
            stage.as_str(),
            counts.dispatched,
            counts.succeeded,
            counts.fetch_failures,
            counts.page_failures,
            counts.dead_branches
        );
    }
    println!();

    println!(
        "Pages dispatched: {} ({} failed)",
        stats.total_dispatched(),
        stats.total_failed()
    );
    println!("Records written: {}", stats.records_written);
    println!("Articles without metrics link: {}", stats.dropped_articles());
    if stats.aborted_tasks > 0 {
        println!("Aborted tasks: {}", stats.aborted_tasks);
    }

    let metrics = stats.stage(Stage::Metrics);
    let yield_rate = if metrics.dispatched > 0 {
        (stats.records_written as f64 / metrics.dispatched as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Metrics yield: {:.1}% ({} / {} metrics pages)",
        yield_rate, stats.records_written, metrics.dispatched
    );
}
