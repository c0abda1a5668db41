//! Tests for the JSON and Markdown report formats.

use std::path::PathBuf;

use asyncheck::{analyze_file, render, AnalysisResult, ReportFormat};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn analyze_fixtures() -> Vec<AnalysisResult> {
    ["blocking.py", "broken.py", "clean.py"]
        .iter()
        .map(|name| analyze_file(&testdata_path().join(name)))
        .collect()
}

#[test]
fn test_json_summary_counts() {
    let results = analyze_fixtures();
    let rendered = render(&results, ReportFormat::Json).unwrap();
    let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    let summary = &json["summary"];
    assert_eq!(summary["total_files"], 3);
    assert_eq!(summary["files_with_async"], 2);
    // blocking.py: 3 issues; broken.py: 1; clean.py: 0
    assert_eq!(summary["total_issues"], 4);
    // blocking_call_in_async + syntax_error
    assert_eq!(summary["critical_issues"], 2);
    // gather_without_exception_handling
    assert_eq!(summary["warnings"], 1);
}

#[test]
fn test_json_file_entries() {
    let results = analyze_fixtures();
    let rendered = render(&results, ReportFormat::Json).unwrap();
    let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    let files = json["files"].as_array().unwrap();
    // All three fixtures qualify: two have issues, clean.py has async code.
    assert_eq!(files.len(), 3);

    let clean = files
        .iter()
        .find(|f| f["path"].as_str().unwrap().ends_with("clean.py"))
        .unwrap();
    assert_eq!(clean["has_async_code"], true);
    assert_eq!(clean["async_functions"][0], "add");
    assert!(clean["issues"].as_array().unwrap().is_empty());

    let blocking = files
        .iter()
        .find(|f| f["path"].as_str().unwrap().ends_with("blocking.py"))
        .unwrap();
    let issue = &blocking["issues"][0];
    assert_eq!(issue["type"], "blocking_call_in_async");
    assert_eq!(issue["severity"], "critical");
    assert_eq!(issue["line"], 6);
    assert_eq!(issue["code"], "time.sleep(2)");
    assert!(issue["suggestion"].as_str().unwrap().contains("asyncio.sleep"));
}

#[test]
fn test_markdown_sections() {
    let results = analyze_fixtures();
    let markdown = render(&results, ReportFormat::Markdown).unwrap();

    assert!(markdown.starts_with("# Async Code Analysis Report"));
    assert!(markdown.contains("- Files analyzed: 3"));
    assert!(markdown.contains("- Files with async code: 2"));
    assert!(markdown.contains("- Critical issues: 2"));
    assert!(markdown.contains("- Warnings: 1"));

    // Files with issues get a section; async-only files do not.
    assert!(markdown.contains("blocking.py"));
    assert!(markdown.contains("broken.py"));
    assert!(!markdown.contains("clean.py"));

    // Severity glyphs and issue layout.
    assert!(markdown.contains("🔴 **blocking_call_in_async** (line 6)"));
    assert!(markdown.contains("🟡 **gather_without_exception_handling**"));
    assert!(markdown.contains("🔵 **consider_taskgroup**"));
    assert!(markdown.contains("- code: `time.sleep(2)`"));
}

#[test]
fn test_empty_batch_renders() {
    let results: Vec<AnalysisResult> = Vec::new();

    let json: serde_json::Value =
        serde_json::from_str(&render(&results, ReportFormat::Json).unwrap()).unwrap();
    assert_eq!(json["summary"]["total_files"], 0);
    assert!(json["files"].as_array().unwrap().is_empty());

    let markdown = render(&results, ReportFormat::Markdown).unwrap();
    assert!(markdown.contains("- Files analyzed: 0"));
}
