//! Markdown summary generation
//!
//! This module writes a human-readable markdown version of the crawl report, including both
//! throughput series as tables.

use crate::output::report::CrawlReport;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary of a crawl report to `output_path`
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(std::io::Error)` - Failed to create or write the file
pub fn generate_markdown_summary(report: &CrawlReport, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_summary(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_summary(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str("# Ripple-Crawl Summary\n\n");

    md.push_str("## Totals\n\n");
    md.push_str(&format!("- **Stopped**: {}\n", report.stop_reason));
    md.push_str(&format!("- **Total Enqueued**: {}\n", report.total_enqueued));
    md.push_str(&format!(
        "- **Remaining in Frontier**: {}\n",
        report.frontier_remaining
    ));
    md.push_str(&format!("- **Visited**: {}\n", report.visited));
    md.push_str(&format!("- **Pages Recorded**: {}\n", report.pages_recorded));
    md.push_str(&format!("- **Fetch Failures**: {}\n", report.fetch_failures));
    md.push_str(&format!(
        "- **Duration**: {:.1} seconds ({:.2} minutes)\n\n",
        report.elapsed.as_secs_f64(),
        report.elapsed.as_secs_f64() / 60.0
    ));

    md.push_str("## Throughput\n\n");
    if report.stats.is_empty() {
        md.push_str("_No samples were taken; the crawl finished before the first tick._\n");
        return md;
    }

    md.push_str("| Minute | Visited | Visited / Frontier |\n");
    md.push_str("|--------|---------|--------------------|\n");
    for sample in report.stats.samples() {
        let ratio = sample
            .visited_over_frontier
            .map(|r| format!("{:.3}", r))
            .unwrap_or_else(|| "N/A".to_string());
        md.push_str(&format!(
            "| {:.2} | {} | {} |\n",
            sample.elapsed_minutes, sample.visited, ratio
        ));
    }

    md
}
