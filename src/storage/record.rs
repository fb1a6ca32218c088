//! Finished records and discovered-link batches

use std::fmt;

/// Column order of the dataset
pub const DATASET_COLUMNS: [&str; 8] = [
    "article_title",
    "article_volume",
    "article_issue",
    "article_date",
    "article_citations",
    "article_attention",
    "article_tweets",
    "article_views",
];

/// Tweet count as rendered on the metrics page
///
/// The page text is kept verbatim; an absent badge is written as `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TweetCount {
    Absent,
    Text(String),
}

impl fmt::Display for TweetCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "0"),
            Self::Text(text) => write!(f, "{}", text),
        }
    }
}

/// One harvested article, built from a single metrics page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    /// Title with every non-alphanumeric character replaced by a space
    pub title: String,
    pub volume: String,
    pub issue: String,
    pub date: String,
    pub citations: u64,
    pub attention: u64,
    pub tweets: TweetCount,
    pub views: u64,
}

impl ArticleRecord {
    /// Returns the record as dataset fields, in `DATASET_COLUMNS` order
    pub fn to_fields(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.volume.clone(),
            self.issue.clone(),
            self.date.clone(),
            self.citations.to_string(),
            self.attention.to_string(),
            self.tweets.to_string(),
            self.views.to_string(),
        ]
    }
}

/// The links discovered on one parent page, in document order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlBatch {
    /// URL of the page the links were read from
    pub source: String,

    /// Raw hrefs as they appear in the page
    pub urls: Vec<String>,
}

impl UrlBatch {
    pub fn new(source: impl Into<String>, urls: Vec<String>) -> Self {
        Self {
            source: source.into(),
            urls,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_tweets_render_as_zero() {
        assert_eq!(TweetCount::Absent.to_string(), "0");
        assert_eq!(TweetCount::Text("17".to_string()).to_string(), "17");
    }

    #[test]
    fn test_to_fields_order() {
        let record = ArticleRecord {
            title: "A Study".to_string(),
            volume: "500".to_string(),
            issue: "7460".to_string(),
            date: "2013-08-01".to_string(),
            citations: 9,
            attention: 120,
            tweets: TweetCount::Absent,
            views: 1000,
        };

        assert_eq!(
            record.to_fields(),
            vec!["A Study", "500", "7460", "2013-08-01", "9", "120", "0", "1000"]
        );
        assert_eq!(record.to_fields().len(), DATASET_COLUMNS.len());
    }
}
