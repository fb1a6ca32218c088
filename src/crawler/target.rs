//! Crawl targets and fetched documents

use std::fmt;

/// One level of the archive hierarchy
///
/// Each stage names the handler that must process a fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Yearly archive index listing every issue
    Index,
    /// Issue table of contents listing articles
    Issue,
    /// Article page carrying the metrics link
    Article,
    /// Metrics page; terminal
    Metrics,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Index, Stage::Issue, Stage::Article, Stage::Metrics];

    /// The stage that handles links discovered by this one
    pub fn next(&self) -> Option<Stage> {
        match self {
            Self::Index => Some(Self::Issue),
            Self::Issue => Some(Self::Article),
            Self::Article => Some(Self::Metrics),
            Self::Metrics => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Issue => "issue",
            Self::Article => "article",
            Self::Metrics => "metrics",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A URL plus the stage whose handler processes its response
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrawlTarget {
    pub url: String,
    pub stage: Stage,
}

impl CrawlTarget {
    pub fn new(url: impl Into<String>, stage: Stage) -> Self {
        Self {
            url: url.into(),
            stage,
        }
    }
}

/// A fetched page body and the target it was fetched for
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub target: CrawlTarget,
    /// HTTP status; 401 pages are processed like 2xx
    pub status: u16,
    pub body: String,
}

impl RawDocument {
    pub fn new(target: CrawlTarget, status: u16, body: impl Into<String>) -> Self {
        Self {
            target,
            status,
            body: body.into(),
        }
    }
}
