use chrono::Datelike;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Journal-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Builds a configuration with defaults for everything except the lower year bound
    pub fn with_lower_year_bound(lower_year_bound: i32) -> Self {
        Self {
            crawler: CrawlerConfig::new(lower_year_bound),
            site: SiteConfig::default(),
            user_agent: UserAgentConfig::default(),
            output: OutputConfig::default(),
        }
    }

    /// Builds the yearly archive index URL
    ///
    /// The years run from the upper bound (the current calendar year unless
    /// configured) down to the lower bound inclusive, joined by hyphens:
    /// `http://www.nature.com/nature/archive/?year=2024-2023-...-2009`.
    pub fn seed_url(&self) -> String {
        let upper = self.crawler.effective_upper_year();
        let years: Vec<String> = (self.crawler.lower_year_bound..=upper)
            .rev()
            .map(|year| year.to_string())
            .collect();

        format!(
            "{}{}{}",
            self.site.base_url,
            self.site.archive_path,
            years.join("-")
        )
    }
}

/// How ambiguous multi-match counts are reduced to one value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    /// Maximum under string ordering ("9" beats "10"); matches existing datasets
    #[default]
    Lexicographic,
    /// Maximum under numeric ordering
    Numeric,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Oldest year included in the archive index
    #[serde(rename = "lower-year-bound")]
    pub lower_year_bound: i32,

    /// Newest year included in the archive index (defaults to the current year)
    #[serde(rename = "upper-year-bound", default)]
    pub upper_year_bound: Option<i32>,

    /// Use the full-article container on issue pages instead of letters/contents
    #[serde(rename = "prefer-full-text-articles", default)]
    pub prefer_full_text_articles: bool,

    /// Fixed delay between dispatched requests (seconds)
    #[serde(rename = "request-delay-seconds", default = "default_request_delay")]
    pub request_delay_seconds: f64,

    /// Maximum number of requests in flight
    #[serde(rename = "max-concurrent-requests", default = "default_max_concurrent")]
    pub max_concurrent_requests: u32,

    /// Reduction rule for citation and attention matches
    #[serde(default)]
    pub aggregation: AggregationMode,
}

impl CrawlerConfig {
    pub fn new(lower_year_bound: i32) -> Self {
        Self {
            lower_year_bound,
            upper_year_bound: None,
            prefer_full_text_articles: false,
            request_delay_seconds: default_request_delay(),
            max_concurrent_requests: default_max_concurrent(),
            aggregation: AggregationMode::default(),
        }
    }

    /// Upper year bound, falling back to the current calendar year
    pub fn effective_upper_year(&self) -> i32 {
        self.upper_year_bound
            .unwrap_or_else(|| chrono::Local::now().year())
    }

    /// The inter-request delay as a Duration
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs_f64(self.request_delay_seconds)
    }
}

fn default_request_delay() -> f64 {
    0.75
}

fn default_max_concurrent() -> u32 {
    8
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL every discovered link is appended to
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the archive index, ending where the year list begins
    #[serde(rename = "archive-path")]
    pub archive_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://www.nature.com".to_string(),
            archive_path: "/nature/archive/?year=".to_string(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Literal User-Agent header value
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: "Mozilla/5.0 (Windows NT 6.1) AppleWebKit/536.3 (KHTML, like Gecko) Chrome/19.0.1061.1 Safari/536.3".to_string(),
        }
    }
}

/// Output configuration
///
/// File names are templates; `{year}` is replaced with the lower year bound.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory all output files are written into
    pub directory: PathBuf,

    /// Dataset file name template
    pub dataset: String,

    /// Audit file for issue links found on the index page
    #[serde(rename = "issue-urls")]
    pub issue_urls: String,

    /// Audit file for article links found on issue pages
    #[serde(rename = "article-urls")]
    pub article_urls: String,

    /// Audit file for metrics links found on article pages
    #[serde(rename = "metric-urls")]
    pub metric_urls: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            dataset: "nature_data_{year}.csv".to_string(),
            issue_urls: "issue_urls_{year}.csv".to_string(),
            article_urls: "article_urls_{year}.csv".to_string(),
            metric_urls: "metric_urls_{year}.csv".to_string(),
        }
    }
}

impl OutputConfig {
    /// Renders a file name template into a path inside the output directory
    pub fn render(&self, template: &str, year: i32) -> PathBuf {
        self.directory
            .join(template.replace("{year}", &year.to_string()))
    }
}
