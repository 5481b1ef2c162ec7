//! Report output formats

use crate::usage::{UsageReport, EMPTY_MESSAGE};
use anyhow::{Context, Result};

const LOCATION_INDENT: &str = "            ";

/// Plain text report for terminals
pub fn format_text(report: &UsageReport) -> String {
    let mut out = String::new();
    out.push_str(&report.title);
    out.push('\n');

    if report.is_empty() {
        out.push('\n');
        out.push_str(EMPTY_MESSAGE);
        out.push('\n');
    }

    for row in &report.rows {
        out.push('\n');
        out.push_str(&format!("{} [{}]\n", row.display_title(), row.entity));

        let location = if row.location.is_empty() {
            "-".to_string()
        } else {
            // Continuation lines line up under the first location
            row.location
                .lines()
                .collect::<Vec<_>>()
                .join(&format!("\n{}", LOCATION_INDENT))
        };
        out.push_str(&format!("  Location: {}\n", location));
        out.push_str(&format!("  View:     {}\n", row.view.as_deref().unwrap_or("-")));
        out.push_str(&format!("  Edit:     {}\n", row.edit.as_deref().unwrap_or("-")));
    }

    if let Some(truncation) = report.truncation {
        out.push('\n');
        out.push_str(&format!(
            "Note: results truncated ({}) after {} entities\n",
            truncation.reason, truncation.nodes
        ));
    }

    out
}

pub fn to_json(report: &UsageReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report as JSON")
}

pub fn to_yaml(report: &UsageReport) -> Result<String> {
    serde_yaml::to_string(report).context("Failed to serialize report as YAML")
}
