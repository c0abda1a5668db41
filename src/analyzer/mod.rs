//! Per-file analysis orchestration.
//!
//! `analyze_file` / `analyze_source` wire the parser, the import-aware
//! visitor, and the knowledge-base rules together for exactly one file.
//! Failures are contained per file: an unparseable or unreadable file
//! still yields one `AnalysisResult` carrying a single issue that says
//! why, and never aborts the batch.

mod resolver;
mod types;
mod visitor;

pub use resolver::{resolve_call_name, ImportMap};
pub use types::{Issue, IssueType, Severity};
pub use visitor::Visitor;

use std::fs;
use std::path::Path;

use tree_sitter::{Node, Parser};

/// Outcome of analyzing one file. Never mutated after analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub file_path: String,
    /// Detection order.
    pub issues: Vec<Issue>,
    /// True iff `async_functions` is non-empty.
    pub has_async_code: bool,
    /// Async function names in declaration order.
    pub async_functions: Vec<String>,
}

impl AnalysisResult {
    fn empty(file_path: &str) -> Self {
        Self {
            file_path: file_path.to_string(),
            issues: Vec::new(),
            has_async_code: false,
            async_functions: Vec::new(),
        }
    }

    pub fn critical_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Critical)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }
}

/// Analyze one Python file on disk.
///
/// A read failure (missing file, permissions, non-UTF-8 bytes) is
/// reported as a single `analysis_error` issue, not propagated.
pub fn analyze_file(path: &Path) -> AnalysisResult {
    let display = path.to_string_lossy();
    match fs::read_to_string(path) {
        Ok(source) => analyze_source(&display, &source),
        Err(e) => analysis_error_result(&display, format!("analysis failed: {}", e)),
    }
}

/// Analyze already-loaded Python source.
///
/// A file that does not parse yields exactly one `syntax_error` issue at
/// the first error node's line; traversal is skipped entirely, so an
/// unparseable file never produces partial results.
pub fn analyze_source(file_path: &str, source: &str) -> AnalysisResult {
    let mut parser = Parser::new();
    let language = tree_sitter_python::LANGUAGE.into();
    if parser.set_language(&language).is_err() {
        return analysis_error_result(file_path, "analysis failed: parser unavailable".to_string());
    }

    let Some(tree) = parser.parse(source, None) else {
        return syntax_error_result(file_path, 0, source);
    };

    let root = tree.root_node();
    if root.has_error() {
        let line = first_error_line(root).unwrap_or(0);
        return syntax_error_result(file_path, line, source);
    }

    let mut visitor = Visitor::new(file_path, source);
    visitor.walk(root);
    let (issues, async_functions) = visitor.finish();

    AnalysisResult {
        file_path: file_path.to_string(),
        has_async_code: !async_functions.is_empty(),
        issues,
        async_functions,
    }
}

fn syntax_error_result(file_path: &str, line: usize, source: &str) -> AnalysisResult {
    let original_code = line
        .checked_sub(1)
        .and_then(|i| source.split('\n').nth(i))
        .map(|l| l.trim().to_string())
        .unwrap_or_default();

    let mut result = AnalysisResult::empty(file_path);
    result.issues.push(Issue {
        file_path: file_path.to_string(),
        line,
        issue_type: IssueType::SyntaxError,
        severity: Severity::Critical,
        message: "syntax error: file does not parse as Python".to_string(),
        suggestion: "fix the syntax error and re-run the analysis".to_string(),
        original_code,
    });
    result
}

fn analysis_error_result(file_path: &str, message: String) -> AnalysisResult {
    let mut result = AnalysisResult::empty(file_path);
    result.issues.push(Issue {
        file_path: file_path.to_string(),
        line: 0,
        issue_type: IssueType::AnalysisError,
        severity: Severity::Warning,
        message,
        suggestion: "check that the file is readable UTF-8 text".to_string(),
        original_code: String::new(),
    });
    result
}

/// First ERROR or missing node in pre-order, pruned to error subtrees.
fn first_error_line(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    for child in children {
        if child.has_error() {
            if let Some(line) = first_error_line(child) {
                return Some(line);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_keeps_input_path() {
        let result = analyze_source("pkg/app.py", "x = 1\n");
        assert_eq!(result.file_path, "pkg/app.py");
        assert!(result.issues.is_empty());
        assert!(!result.has_async_code);
    }

    #[test]
    fn test_syntax_error_yields_single_issue() {
        let result = analyze_source("bad.py", "def broken(:\n    pass\n");
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].issue_type, IssueType::SyntaxError);
        assert_eq!(result.issues[0].severity, Severity::Critical);
        assert!(result.issues[0].line >= 1);
        assert!(!result.has_async_code);
        assert!(result.async_functions.is_empty());
    }

    #[test]
    fn test_syntax_error_skips_traversal() {
        // The async function would normally be recorded; a parse failure
        // anywhere in the file must suppress all partial results.
        let source = "async def ok():\n    pass\n\ndef broken(:\n";
        let result = analyze_source("bad.py", source);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].issue_type, IssueType::SyntaxError);
        assert!(result.async_functions.is_empty());
    }

    #[test]
    fn test_has_async_code_tracks_async_functions() {
        let result = analyze_source("a.py", "async def worker():\n    value = 1\n");
        assert!(result.has_async_code);
        assert_eq!(result.async_functions, vec!["worker"]);

        let result = analyze_source("b.py", "def worker():\n    value = 1\n");
        assert!(!result.has_async_code);
    }

    #[test]
    fn test_blocking_sleep_scenario() {
        let source = "import time\n\nasync def handler():\n    time.sleep(1)\n";
        let result = analyze_source("app.py", source);
        assert_eq!(result.issues.len(), 1);
        let issue = &result.issues[0];
        assert_eq!(issue.issue_type, IssueType::BlockingCallInAsync);
        assert_eq!(issue.severity, Severity::Critical);
        assert_eq!(issue.line, 4);
        assert!(issue.suggestion.contains("asyncio.sleep"));
        assert_eq!(issue.file_path, "app.py");
    }

    #[test]
    fn test_module_level_fetch_scenario() {
        let result = analyze_source("script.py", "fetch_users()\n");
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].issue_type, IssueType::BareCoroutineCall);
        assert_eq!(result.issues[0].severity, Severity::Critical);
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let source = "import time\nasync def f():\n    time.sleep(1)\n    data = fetch()\n";
        let first = analyze_source("same.py", source);
        let second = analyze_source("same.py", source);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_file_becomes_analysis_error() {
        let result = analyze_file(Path::new("/nonexistent/__asyncheck_missing__.py"));
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].issue_type, IssueType::AnalysisError);
        assert_eq!(result.issues[0].severity, Severity::Warning);
        assert_eq!(result.issues[0].line, 0);
    }

    #[test]
    fn test_issue_counts() {
        let source = "import asyncio\nasync def f():\n    await asyncio.gather(first())\n";
        let result = analyze_source("g.py", source);
        assert_eq!(result.warning_count(), 1);
        assert_eq!(result.critical_count(), 0);
    }
}
