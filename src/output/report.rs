//! End-of-crawl summary
//!
//! This module holds the final tallies of a crawl and renders them for stdout.

use crate::output::stats::StatsSeries;
use std::fmt;
use std::time::Duration;

/// Why the crawl loop stopped issuing work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The visited set reached the configured page cap
    CapReached,

    /// The frontier emptied with nothing left in flight
    FrontierExhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapReached => f.write_str("page cap reached"),
            Self::FrontierExhausted => f.write_str("frontier exhausted"),
        }
    }
}

/// Final tallies of a completed crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// URLs ever appended to the frontier
    pub total_enqueued: usize,

    /// URLs still waiting in the frontier
    pub frontier_remaining: usize,

    /// Distinct URLs dequeued for fetching
    pub visited: usize,

    /// Page records handed to the sink
    pub pages_recorded: usize,

    /// Fetches that failed and were skipped
    pub fetch_failures: usize,

    pub stop_reason: StopReason,

    pub elapsed: Duration,

    pub stats: StatsSeries,
}

impl CrawlReport {
    /// Renders the summary block printed at the end of a crawl
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("\n=== Crawl Summary ===\n\n");
        out.push_str(&format!("Stopped: {}\n", self.stop_reason));
        out.push_str(&format!("Total enqueued: {}\n", self.total_enqueued));
        out.push_str(&format!("Remaining in frontier: {}\n", self.frontier_remaining));
        out.push_str(&format!("Visited: {}\n", self.visited));
        out.push_str(&format!("Pages recorded: {}\n", self.pages_recorded));
        out.push_str(&format!("Fetch failures: {}\n", self.fetch_failures));
        out.push_str(&format!(
            "Elapsed: {:.1}s\n\n",
            self.elapsed.as_secs_f64()
        ));

        out.push_str("Pages visited per minute:\n");
        out.push_str(&self.stats.pages_series());
        out.push('\n');

        out.push_str("Visited to frontier ratio per minute:\n");
        out.push_str(&self.stats.ratio_series());

        out
    }
}

/// Prints the crawl summary to stdout
pub fn print_report(report: &CrawlReport) {
    print!("{}", report.render());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::stats::StatsSample;

    fn sample_report() -> CrawlReport {
        let mut stats = StatsSeries::new();
        stats.record(StatsSample {
            elapsed_minutes: 1.0,
            visited: 42,
            visited_over_frontier: Some(0.25),
        });

        CrawlReport {
            total_enqueued: 210,
            frontier_remaining: 168,
            visited: 42,
            pages_recorded: 40,
            fetch_failures: 2,
            stop_reason: StopReason::CapReached,
            elapsed: Duration::from_secs(65),
            stats,
        }
    }

    #[test]
    fn test_render_contains_totals() {
        let text = sample_report().render();

        assert!(text.contains("Stopped: page cap reached"));
        assert!(text.contains("Total enqueued: 210"));
        assert!(text.contains("Remaining in frontier: 168"));
        assert!(text.contains("Visited: 42"));
        assert!(text.contains("Fetch failures: 2"));
    }

    #[test]
    fn test_render_contains_both_series() {
        let text = sample_report().render();

        let pages = text.find("Pages visited per minute:").unwrap();
        let ratio = text.find("Visited to frontier ratio per minute:").unwrap();
        assert!(pages < ratio);
        assert!(text.contains("1.000000 42\n"));
        assert!(text.contains("1.000000 0.250000\n"));
    }

    #[test]
    fn test_stop_reason_display() {
        assert_eq!(StopReason::FrontierExhausted.to_string(), "frontier exhausted");
    }
}
