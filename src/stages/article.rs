//! Article page

use crate::crawler::RawDocument;
use crate::extract::select_attr;
use crate::stages::{StageContext, StageOutcome};
use crate::storage::UrlBatch;
use crate::ExtractResult;
use scraper::Html;

/// Metrics link; the class must match exactly
pub const METRICS_LINKS: &str = r#"li[class="article-metrics"] > a[href]"#;

/// Follows the first metrics link only
///
/// Every match is audited. A page without one is dropped quietly.
pub fn handle(document: &RawDocument, context: &StageContext) -> ExtractResult<StageOutcome> {
    let html = Html::parse_document(&document.body);
    let links = select_attr(&html, METRICS_LINKS, "href")?;

    let targets = context.follow(document.target.stage, links.first());

    if targets.is_empty() {
        tracing::debug!("Article {} has no metrics link; dropped", document.target.url);
    }

    Ok(StageOutcome::FollowUp {
        audit: UrlBatch::new(document.target.url.clone(), links),
        targets,
    })
}
