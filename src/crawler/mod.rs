//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The FIFO frontier of pending URLs
//! - HTTP fetching
//! - HTML parsing and link extraction
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{run_crawl, Coordinator, PageOutcome};
pub use fetcher::{build_http_client, fetch_page, FetchError};
pub use frontier::Frontier;
pub use parser::{extract_links, is_crawlable_href, parse_page, ParsedPage};

pub use crate::sink::PageRecord;

use crate::config::{validate, Config};
use crate::output::CrawlReport;
use crate::sink::open_sink;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration, before the sink wipes any stored records
/// 2. Open and connect the configured sink (or fall back to a disabled one)
/// 3. Build the HTTP client
/// 4. Seed the frontier and crawl breadth-first
/// 5. Wait for in-flight pages, stop sampling and disconnect the sink
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed (cap reached or frontier exhausted)
/// * `Err(CrawlError)` - The configuration is invalid, a mandatory sink could not be connected,
///   or setup failed
pub async fn crawl(config: Config) -> Result<CrawlReport, CrawlError> {
    validate(&config)?;
    let sink = open_sink(&config.sink)?;
    run_crawl(config, sink).await
}
