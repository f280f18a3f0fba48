//! Output module for crawl reports
//!
//! This module handles:
//! - Building the final report from the registry
//! - Printing the console summary
//! - Writing the markdown summary and JSON export

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_report, write_markdown_report};
pub use stats::{format_report, print_report, BrokenLink, CrawlReport};

use crate::LinkCheckError;

/// Prints the report as pretty JSON on stdout
pub fn print_json_report(report: &CrawlReport) -> Result<(), LinkCheckError> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{}", json);
    Ok(())
}
