//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives the stage graph:
//! - Dispatching targets through the shared throttle
//! - Routing each fetched page to the handler for its stage
//! - Persisting audit batches and records through the sink
//! - Feeding discovered targets back into the crawl
//!
//! Every target runs as its own task; siblings complete in any order. A
//! failed target is logged and counted, and nothing below it is crawled.

use crate::config::{validate, Config};
use crate::crawler::fetcher::{build_http_client, fetch};
use crate::crawler::stats::CrawlStatistics;
use crate::crawler::target::{CrawlTarget, RawDocument, Stage};
use crate::crawler::throttle::Throttle;
use crate::stages::{self, StageContext, StageOutcome};
use crate::state::TargetState;
use crate::storage::Sink;
use crate::HarvestError;
use reqwest::Client;
use std::sync::Arc;
use tokio::task::JoinSet;

/// State shared by every in-flight target
struct Shared<S> {
    client: Client,
    throttle: Throttle,
    sink: S,
    context: StageContext,
}

/// What a completed target contributed to the crawl
#[derive(Debug)]
enum Completion {
    /// Targets for the next stage (possibly none)
    FollowUp(Vec<CrawlTarget>),
    /// A record was appended to the dataset
    Record,
}

/// Result of one target's task
struct TaskReport {
    target: CrawlTarget,
    state: TargetState,
    result: Result<Completion, HarvestError>,
}

/// Main crawler coordinator structure
pub struct Coordinator<S: Sink + 'static> {
    config: Arc<Config>,
    shared: Arc<Shared<S>>,
}

impl<S: Sink + 'static> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    /// * `sink` - Destination for records and audit batches
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Invalid configuration or HTTP client failure
    pub fn new(config: Config, sink: S) -> Result<Self, HarvestError> {
        validate(&config)?;

        let client = build_http_client(&config.user_agent)?;
        let throttle = Throttle::from_config(&config.crawler);
        let context = StageContext::from_config(&config);

        Ok(Self {
            config: Arc::new(config),
            shared: Arc::new(Shared {
                client,
                throttle,
                sink,
                context,
            }),
        })
    }

    pub fn sink(&self) -> &S {
        &self.shared.sink
    }

    /// Crawls everything reachable from the yearly archive index
    pub async fn run(&self) -> Result<CrawlStatistics, HarvestError> {
        let seed = CrawlTarget::new(self.config.seed_url(), Stage::Index);
        self.run_from(seed).await
    }

    /// Crawls everything reachable from `seed`
    ///
    /// Returns once no target is pending or in flight. Page-level failures
    /// never end the run; they are reflected in the returned statistics.
    pub async fn run_from(&self, seed: CrawlTarget) -> Result<CrawlStatistics, HarvestError> {
        tracing::info!("Starting harvest from {} ({})", seed.url, seed.stage);

        let start_time = std::time::Instant::now();
        let mut stats = CrawlStatistics::new();
        let mut tasks = JoinSet::new();
        let mut completed: u64 = 0;

        self.dispatch(&mut tasks, &mut stats, seed);

        while let Some(joined) = tasks.join_next().await {
            let report = match joined {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!("Crawl task aborted: {}", e);
                    stats.aborted_tasks += 1;
                    continue;
                }
            };

            completed += 1;
            if let Some(next) = self.record(&mut stats, report) {
                for target in next {
                    self.dispatch(&mut tasks, &mut stats, target);
                }
            }

            if completed % 100 == 0 {
                tracing::info!(
                    "Progress: {} pages done, {} in flight, {} records, {:.2} pages/sec",
                    completed,
                    tasks.len(),
                    stats.records_written,
                    completed as f64 / start_time.elapsed().as_secs_f64()
                );
            }
        }

        tracing::info!(
            "Harvest finished: {} pages, {} records, {} failures in {:?}",
            completed,
            stats.records_written,
            stats.total_failed(),
            start_time.elapsed()
        );

        Ok(stats)
    }

    fn dispatch(
        &self,
        tasks: &mut JoinSet<TaskReport>,
        stats: &mut CrawlStatistics,
        target: CrawlTarget,
    ) {
        stats.stage_mut(target.stage).dispatched += 1;
        tasks.spawn(process_target(Arc::clone(&self.shared), target));
    }

    /// Folds a task report into the statistics and returns targets to dispatch
    fn record(
        &self,
        stats: &mut CrawlStatistics,
        report: TaskReport,
    ) -> Option<Vec<CrawlTarget>> {
        debug_assert!(report.state.is_terminal(), "report for unfinished target");
        let counts = stats.stage_mut(report.target.stage);

        match report.result {
            Ok(Completion::FollowUp(targets)) => {
                counts.succeeded += 1;
                if targets.is_empty() {
                    counts.dead_branches += 1;
                }
                Some(targets)
            }
            Ok(Completion::Record) => {
                counts.succeeded += 1;
                stats.records_written += 1;
                None
            }
            Err(e) => {
                if e.is_fetch_failure() {
                    counts.fetch_failures += 1;
                } else {
                    counts.page_failures += 1;
                }
                tracing::warn!(
                    "{} page {} {}: {}",
                    report.target.stage,
                    report.target.url,
                    report.state,
                    e
                );
                None
            }
        }
    }
}

fn transition(target: &CrawlTarget, state: &mut TargetState, next: TargetState) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal transition {} -> {}",
        state,
        next
    );
    tracing::trace!("{} {}: {} -> {}", target.stage, target.url, state, next);
    *state = next;
}

/// Fetches one target, runs its stage handler, and persists the outcome
async fn process_target<S: Sink>(shared: Arc<Shared<S>>, target: CrawlTarget) -> TaskReport {
    let mut state = TargetState::Pending;

    let Some(permit) = shared.throttle.acquire().await else {
        return TaskReport {
            target,
            state: TargetState::Failed,
            result: Err(HarvestError::Task("dispatch throttle closed".to_string())),
        };
    };
    transition(&target, &mut state, TargetState::Dispatched);

    let fetched = fetch(&shared.client, target.clone()).await;
    drop(permit);

    let result = fetched.and_then(|document| complete(&shared, &document));

    let next = if result.is_ok() {
        TargetState::Succeeded
    } else {
        TargetState::Failed
    };
    transition(&target, &mut state, next);

    TaskReport {
        target,
        state,
        result,
    }
}

/// Runs the stage handler on a fetched page and writes its output
fn complete<S: Sink>(shared: &Shared<S>, document: &RawDocument) -> Result<Completion, HarvestError> {
    if document.status == 401 {
        tracing::debug!("{} answered 401; processing its body", document.target.url);
    }

    let outcome =
        stages::handle(document, &shared.context).map_err(|source| HarvestError::Extract {
            url: document.target.url.clone(),
            source,
        })?;

    match outcome {
        StageOutcome::FollowUp { audit, targets } => {
            shared.sink.append_batch(document.target.stage, &audit)?;
            Ok(Completion::FollowUp(targets))
        }
        StageOutcome::Terminal(record) => {
            shared.sink.append(&record)?;
            tracing::debug!("Recorded '{}' from {}", record.title.trim(), document.target.url);
            Ok(Completion::Record)
        }
    }
}

/// Runs a complete harvest into `sink`
///
/// # Example
///
/// ```no_run
/// use journal_harvest::config::load_config;
/// use journal_harvest::crawler::run_crawl;
/// use journal_harvest::storage::CsvSink;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let sink = CsvSink::from_config(&config.output, config.crawler.lower_year_bound);
/// run_crawl(config, sink).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl<S: Sink + 'static>(
    config: Config,
    sink: S,
) -> Result<CrawlStatistics, HarvestError> {
    let coordinator = Coordinator::new(config, sink)?;
    coordinator.run().await
}
