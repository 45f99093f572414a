use serde::Deserialize;

/// Seed used when neither the config file nor the command line names one
pub const DEFAULT_SEED: &str = "https://www.cc.gatech.edu/";

/// Main configuration structure for Ripple-Crawl
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub sink: SinkConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// URLs the crawl starts from
    pub seeds: Vec<String>,

    /// Number of distinct pages visited before the crawl halts
    pub max_pages: usize,

    /// Maximum number of fetches in flight at once (1 = single-flight)
    pub fetch_concurrency: usize,

    /// Maximum number of pages being parsed at once
    pub parse_workers: usize,

    /// Seconds between throughput samples
    pub stats_interval_secs: u64,

    /// Maximum number of characters of body text kept per page
    pub snippet_cap: usize,

    /// Per-request timeout in seconds; no timeout when unset
    pub fetch_timeout_secs: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seeds: vec![DEFAULT_SEED.to_string()],
            max_pages: 5000,
            fetch_concurrency: 1,
            parse_workers: 8,
            stats_interval_secs: 60,
            snippet_cap: 500,
            fetch_timeout_secs: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "ripple-crawl".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Page record persistence configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SinkConfig {
    /// Path to the SQLite database; the sink is disabled when unset
    pub database_path: Option<String>,

    /// Abort the crawl when the sink cannot be connected
    pub required: bool,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the markdown summary file; no file is written when unset
    pub summary_path: Option<String>,
}
