//! Stage handlers
//!
//! One handler per level of the archive hierarchy. A handler consumes a
//! fetched page and either discovers targets for the next stage or, at the
//! metrics stage, builds a finished record. Handlers are synchronous and do
//! no I/O; the coordinator persists what they return.

mod article;
mod index;
mod issue;
mod metrics;

use crate::config::{AggregationMode, Config};
use crate::crawler::{CrawlTarget, RawDocument, Stage};
use crate::storage::{ArticleRecord, UrlBatch};
use crate::ExtractResult;

/// Settings the handlers read, taken from `Config` once per run
#[derive(Debug, Clone)]
pub struct StageContext {
    pub base_url: String,
    pub prefer_full_text_articles: bool,
    pub aggregation: AggregationMode,
}

impl StageContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.site.base_url.clone(),
            prefer_full_text_articles: config.crawler.prefer_full_text_articles,
            aggregation: config.crawler.aggregation,
        }
    }

    /// Builds a target by appending `href` to the site base
    pub fn target(&self, href: &str, stage: Stage) -> CrawlTarget {
        CrawlTarget::new(format!("{}{}", self.base_url, href), stage)
    }

    /// Targets for links found on a page of stage `from`
    ///
    /// Links on a terminal page lead nowhere and yield no targets.
    pub fn follow<'a, I>(&self, from: Stage, hrefs: I) -> Vec<CrawlTarget>
    where
        I: IntoIterator<Item = &'a String>,
    {
        match from.next() {
            Some(next) => hrefs.into_iter().map(|href| self.target(href, next)).collect(),
            None => Vec::new(),
        }
    }
}

/// What a handler produced from one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// Links discovered on the page and the targets to follow
    ///
    /// `targets` may be empty: a dead branch, not an error.
    FollowUp {
        audit: UrlBatch,
        targets: Vec<CrawlTarget>,
    },

    /// A finished record from a metrics page
    Terminal(ArticleRecord),
}

impl StageOutcome {
    pub fn is_dead_branch(&self) -> bool {
        matches!(self, Self::FollowUp { targets, .. } if targets.is_empty())
    }
}

/// Signature shared by every stage handler
pub type StageHandler = fn(&RawDocument, &StageContext) -> ExtractResult<StageOutcome>;

/// Dispatch table from stage tag to handler
pub fn handler_for(stage: Stage) -> StageHandler {
    match stage {
        Stage::Index => index::handle,
        Stage::Issue => issue::handle,
        Stage::Article => article::handle,
        Stage::Metrics => metrics::handle,
    }
}

/// Runs the handler registered for the document's stage
pub fn handle(document: &RawDocument, context: &StageContext) -> ExtractResult<StageOutcome> {
    handler_for(document.target.stage)(document, context)
}
