//! Markdown summary generation
//!
//! This module writes the crawl report as a markdown document, suitable for
//! attaching to a CI run or committing next to the docs it checked.

use crate::output::stats::CrawlReport;
use crate::LinkCheckError;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use url::Url;

/// Writes the markdown summary of a crawl to `output_path`
///
/// # Arguments
///
/// * `report` - The finished crawl report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(LinkCheckError)` - Failed to write summary
pub fn write_markdown_report(report: &CrawlReport, output_path: &Path) -> Result<(), LinkCheckError> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_report(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str("# Link-Sweeper Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", report.seed));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        report.duration_seconds()
    ));
    if let Some(hash) = &report.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Totals
    md.push_str("## Totals\n\n");
    md.push_str("| Links | Count |\n");
    md.push_str("|-------|-------|\n");
    md.push_str(&format!("| Checked | {} |\n", report.total));
    md.push_str(&format!("| Active | {} |\n", report.active));
    md.push_str(&format!("| Inactive | {} |\n", report.inactive));
    md.push_str(&format!(
        "\n- **Success Rate**: {:.2}%\n\n",
        report.success_rate()
    ));

    if report.broken.is_empty() {
        md.push_str("No broken links found.\n");
        return md;
    }

    md.push_str("## Inactive Links\n\n");
    md.push_str("| URL | Reason | Found on |\n");
    md.push_str("|-----|--------|----------|\n");
    for link in &report.broken {
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(link.url.as_str()),
            escape_cell(&link.reason.to_string()),
            link.source
                .as_ref()
                .map(Url::as_str)
                .map(escape_cell)
                .unwrap_or_else(|| "Initial URL".to_string())
        ));
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
