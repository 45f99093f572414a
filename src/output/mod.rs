//! Output module for crawl statistics and summaries
//!
//! This module handles:
//! - Periodic throughput sampling while the crawl runs
//! - The end-of-crawl report printed to stdout
//! - Optional markdown export of that report

mod markdown;
mod report;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use report::{print_report, CrawlReport, StopReason};
pub use stats::{StatsCollector, StatsSample, StatsSeries};
