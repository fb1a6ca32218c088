//! Issue table of contents

use crate::crawler::RawDocument;
use crate::extract::select_attr;
use crate::stages::{StageContext, StageOutcome};
use crate::storage::UrlBatch;
use crate::ExtractResult;
use scraper::Html;

/// Container of full research articles
pub const FULL_TEXT_CONTAINER: &str = "div#af";

/// Container of letters and the general table of contents
pub const ARTICLE_CONTAINER: &str = "div#lt";

fn article_links_query(container: &str) -> String {
    format!("{} hgroup > h1 > a[href]", container)
}

/// Reads the article links from the configured container
pub fn handle(document: &RawDocument, context: &StageContext) -> ExtractResult<StageOutcome> {
    let container = if context.prefer_full_text_articles {
        FULL_TEXT_CONTAINER
    } else {
        ARTICLE_CONTAINER
    };

    let html = Html::parse_document(&document.body);
    let links = select_attr(&html, &article_links_query(container), "href")?;

    let targets = context.follow(document.target.stage, &links);

    if targets.is_empty() {
        tracing::debug!("Issue {} has no articles in {}", document.target.url, container);
    }

    Ok(StageOutcome::FollowUp {
        audit: UrlBatch::new(document.target.url.clone(), links),
        targets,
    })
}
