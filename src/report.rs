//! Report aggregation and rendering.
//!
//! Two output forms:
//! - JSON: structured output for programmatic consumption
//! - Markdown: human-readable summary
//!
//! The two forms intentionally include different file sets: JSON lists
//! every file with issues or async code, Markdown only files with
//! issues. Downstream tooling depends on both behaviors.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analyzer::{AnalysisResult, Severity};

/// Selectable output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Markdown,
}

#[derive(Debug, Error)]
#[error("unknown report format {0:?} (expected 'json' or 'markdown')")]
pub struct ParseFormatError(String);

impl FromStr for ReportFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            other => Err(ParseFormatError(other.to_string())),
        }
    }
}

/// Top-level JSON report.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub summary: Summary,
    pub files: Vec<FileEntry>,
}

/// Aggregate counts over all analyzed files.
#[derive(Serialize, Deserialize)]
pub struct Summary {
    pub total_files: usize,
    pub files_with_async: usize,
    pub total_issues: usize,
    pub critical_issues: usize,
    pub warnings: usize,
}

/// Per-file entry; present when the file has issues or async code.
#[derive(Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub has_async_code: bool,
    pub async_functions: Vec<String>,
    pub issues: Vec<JsonIssue>,
}

#[derive(Serialize, Deserialize)]
pub struct JsonIssue {
    pub line: usize,
    #[serde(rename = "type")]
    pub issue_type: String,
    pub severity: String,
    pub message: String,
    pub suggestion: String,
    pub code: String,
}

/// Render the aggregated report in the requested format.
pub fn render(results: &[AnalysisResult], format: ReportFormat) -> anyhow::Result<String> {
    match format {
        ReportFormat::Json => Ok(serde_json::to_string_pretty(&build_json(results))?),
        ReportFormat::Markdown => Ok(render_markdown(results)),
    }
}

/// Compute the summary counts over all results.
pub fn build_summary(results: &[AnalysisResult]) -> Summary {
    Summary {
        total_files: results.len(),
        files_with_async: results.iter().filter(|r| r.has_async_code).count(),
        total_issues: results.iter().map(|r| r.issues.len()).sum(),
        critical_issues: results.iter().map(|r| r.critical_count()).sum(),
        warnings: results.iter().map(|r| r.warning_count()).sum(),
    }
}

/// Build the structured report; files with neither issues nor async code
/// are omitted entirely.
pub fn build_json(results: &[AnalysisResult]) -> JsonReport {
    let files = results
        .iter()
        .filter(|r| !r.issues.is_empty() || r.has_async_code)
        .map(|r| FileEntry {
            path: r.file_path.clone(),
            has_async_code: r.has_async_code,
            async_functions: r.async_functions.clone(),
            issues: r
                .issues
                .iter()
                .map(|i| JsonIssue {
                    line: i.line,
                    issue_type: i.issue_type.as_str().to_string(),
                    severity: i.severity.to_string(),
                    message: i.message.clone(),
                    suggestion: i.suggestion.clone(),
                    code: i.original_code.clone(),
                })
                .collect(),
        })
        .collect();

    JsonReport {
        summary: build_summary(results),
        files,
    }
}

fn severity_glyph(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::Warning => "🟡",
        Severity::Info => "🔵",
    }
}

fn render_markdown(results: &[AnalysisResult]) -> String {
    let summary = build_summary(results);
    let mut lines = vec![
        "# Async Code Analysis Report".to_string(),
        String::new(),
        "## Summary".to_string(),
        String::new(),
        format!("- Files analyzed: {}", summary.total_files),
        format!("- Files with async code: {}", summary.files_with_async),
        format!("- Critical issues: {}", summary.critical_issues),
        format!("- Warnings: {}", summary.warnings),
        String::new(),
    ];

    for result in results {
        // Async-only files stay out of the Markdown form.
        if result.issues.is_empty() {
            continue;
        }
        lines.push(format!("## {}", result.file_path));
        lines.push(String::new());
        for issue in &result.issues {
            lines.push(format!(
                "{} **{}** (line {})",
                severity_glyph(issue.severity),
                issue.issue_type,
                issue.line
            ));
            lines.push(format!("   - problem: {}", issue.message));
            lines.push(format!("   - suggestion: {}", issue.suggestion));
            if !issue.original_code.is_empty() {
                lines.push(format!("   - code: `{}`", issue.original_code));
            }
            lines.push(String::new());
        }
    }

    lines.join("\n")
}
