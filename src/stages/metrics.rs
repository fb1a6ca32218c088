//! Metrics page
//!
//! The only terminal stage. Title, date, volume and issue come from page
//! metadata and are required. Tweets and views default when absent.
//! Citations and attention may be rendered by several badges, so every
//! embedded digit run is collected and the maximum kept.

use crate::crawler::RawDocument;
use crate::extract::{aggregate_count, digit_runs, sanitize_title, FieldExtractor, FieldQuery};
use crate::stages::{StageContext, StageOutcome};
use crate::storage::{ArticleRecord, TweetCount};
use crate::ExtractResult;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

pub const TITLE: FieldQuery = FieldQuery::meta("title", r#"meta[name="DC.title"]"#);
pub const DATE: FieldQuery = FieldQuery::meta("date", r#"meta[name="DC.date"]"#);
pub const VOLUME: FieldQuery = FieldQuery::meta("volume", r#"meta[name="prism.volume"]"#);
pub const ISSUE: FieldQuery = FieldQuery::meta("issue", r#"meta[name="prism.issue"]"#);
pub const CITATIONS: FieldQuery = FieldQuery::text("citations", r#"div[class="citation-count"]"#);
pub const ATTENTION: FieldQuery =
    FieldQuery::attr("attention", r#"img[alt="altmetric-donut"]"#, "src");
pub const TWEETS: FieldQuery = FieldQuery::text("tweets", r#"div[class="altmetric-twitter"] > b"#);
pub const VIEWS: FieldQuery = FieldQuery::text("views", r#"span[class="total"]"#);

// ASCII digits only; other scripts' digits would not parse as counts
static CITATION_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+)").unwrap());
static ATTENTION_SCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"score=([0-9]+)").unwrap());

/// Builds the article record from a metrics page
pub fn handle(document: &RawDocument, context: &StageContext) -> ExtractResult<StageOutcome> {
    let html = Html::parse_document(&document.body);
    let fields = FieldExtractor::new(&html);

    let title = sanitize_title(&fields.required(&TITLE)?);
    let date = fields.required(&DATE)?;
    let volume = fields.required(&VOLUME)?;
    let issue = fields.required(&ISSUE)?;

    let tweets = match fields.first(&TWEETS)? {
        Some(text) => TweetCount::Text(text),
        None => TweetCount::Absent,
    };
    let views = fields.count_or_zero(&VIEWS)?;

    let citation_runs = digit_runs(
        fields.all(&CITATIONS)?.iter().map(String::as_str),
        &CITATION_DIGITS,
    );
    let citations = aggregate_count(CITATIONS.name, &citation_runs, context.aggregation)?;

    let attention_runs = digit_runs(
        fields.all(&ATTENTION)?.iter().map(String::as_str),
        &ATTENTION_SCORE,
    );
    let attention = aggregate_count(ATTENTION.name, &attention_runs, context.aggregation)?;

    Ok(StageOutcome::Terminal(ArticleRecord {
        title,
        volume,
        issue,
        date,
        citations,
        attention,
        tweets,
        views,
    }))
}
