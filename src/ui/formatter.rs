//! Pure formatting functions for UI output.
//!
//! Everything here only prints; prompting lives in the parent module.

use crate::bump::BumpReport;
use crate::lifecycle::LifecycleReport;
use crate::warning::ReleaseWarning;
use console::style;
use std::path::PathBuf;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a non-fatal release problem.
pub fn display_warning(warning: &ReleaseWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

pub fn display_warnings(warnings: &[ReleaseWarning]) {
    for warning in warnings {
        display_warning(warning);
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Summary lines for a project lifecycle step, one per non-empty field
pub fn lifecycle_summary(report: &LifecycleReport) -> Vec<String> {
    let mut lines = Vec::new();
    if !report.branched.is_empty() {
        lines.push(format!("Branched: {}", report.branched.join(", ")));
    }
    if report.created_package {
        lines.push("Created primary package".to_string());
    }
    if !report.copied.is_empty() {
        lines.push(format!("Copied: {}", join_paths(&report.copied)));
    }
    if !report.committed.is_empty() {
        lines.push(format!("Committed: {}", join_paths(&report.committed)));
    }
    lines
}

/// Summary lines for a packaging bump
pub fn bump_summary(report: &BumpReport) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(commit) = &report.upstream_commit {
        lines.push(format!("Upstream commit: {}", commit));
    }
    if !report.patched.is_empty() {
        lines.push(format!("Patched: {}", join_paths(&report.patched)));
    }
    if !report.artifacts.is_empty() {
        lines.push(format!("Staged: {}", join_paths(&report.artifacts)));
    }
    if !report.committed.is_empty() {
        lines.push(format!("Committed: {}", join_paths(&report.committed)));
    }
    lines
}

/// Print a titled summary followed by any warnings.
pub fn display_report(title: &str, lines: &[String], warnings: &[ReleaseWarning]) {
    println!("\n{}", style(title).bold());
    for line in lines {
        println!("  {}", line);
    }
    display_warnings(warnings);
}
