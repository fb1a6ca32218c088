//! Yearly archive index

use crate::crawler::RawDocument;
use crate::extract::select_attr;
use crate::stages::{StageContext, StageOutcome};
use crate::storage::UrlBatch;
use crate::ExtractResult;
use scraper::Html;

/// Issue links: anchors directly inside a nested list item
pub const ISSUE_LINKS: &str = "li li > a[href]";

/// Substring marking supplementary issues, which are not followed
pub const SUPPLEMENT_MARKER: &str = "supp";

/// Reads every issue link; all of them are audited, non-supplementary ones followed
pub fn handle(document: &RawDocument, context: &StageContext) -> ExtractResult<StageOutcome> {
    let html = Html::parse_document(&document.body);
    let links = select_attr(&html, ISSUE_LINKS, "href")?;

    let targets = context.follow(
        document.target.stage,
        links.iter().filter(|link| !link.contains(SUPPLEMENT_MARKER)),
    );

    tracing::debug!(
        "Index {}: {} issue links, {} followed",
        document.target.url,
        links.len(),
        targets.len()
    );

    Ok(StageOutcome::FollowUp {
        audit: UrlBatch::new(document.target.url.clone(), links),
        targets,
    })
}
