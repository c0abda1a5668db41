//! Core types for detected issues.

use serde::{Deserialize, Serialize};

/// Severity levels for issues.
///
/// The derived ordering ranks `Critical` above `Warning` above `Info`,
/// so results can be sorted worst-first with `sort_by_key(Reverse(..))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "critical"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// The fixed set of detectable issue types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    EmptyAsyncFunction,
    BlockingCallInAsync,
    AwaitingBlockingCall,
    DeprecatedAsyncioApi,
    GatherWithoutExceptionHandling,
    ConsiderTaskgroup,
    UnawaitedCoroutine,
    BareCoroutineCall,
    SyntaxError,
    AnalysisError,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::EmptyAsyncFunction => "empty_async_function",
            IssueType::BlockingCallInAsync => "blocking_call_in_async",
            IssueType::AwaitingBlockingCall => "awaiting_blocking_call",
            IssueType::DeprecatedAsyncioApi => "deprecated_asyncio_api",
            IssueType::GatherWithoutExceptionHandling => "gather_without_exception_handling",
            IssueType::ConsiderTaskgroup => "consider_taskgroup",
            IssueType::UnawaitedCoroutine => "unawaited_coroutine",
            IssueType::BareCoroutineCall => "bare_coroutine_call",
            IssueType::SyntaxError => "syntax_error",
            IssueType::AnalysisError => "analysis_error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "empty_async_function" => Some(IssueType::EmptyAsyncFunction),
            "blocking_call_in_async" => Some(IssueType::BlockingCallInAsync),
            "awaiting_blocking_call" => Some(IssueType::AwaitingBlockingCall),
            "deprecated_asyncio_api" => Some(IssueType::DeprecatedAsyncioApi),
            "gather_without_exception_handling" => Some(IssueType::GatherWithoutExceptionHandling),
            "consider_taskgroup" => Some(IssueType::ConsiderTaskgroup),
            "unawaited_coroutine" => Some(IssueType::UnawaitedCoroutine),
            "bare_coroutine_call" => Some(IssueType::BareCoroutineCall),
            "syntax_error" => Some(IssueType::SyntaxError),
            "analysis_error" => Some(IssueType::AnalysisError),
            _ => None,
        }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One detected defect, immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub file_path: String,
    /// 1-based line number, 0 when not attributable to a line.
    pub line: usize,
    pub issue_type: IssueType,
    pub severity: Severity,
    pub message: String,
    pub suggestion: String,
    /// Trimmed verbatim source line at `line`, or empty.
    pub original_code: String,
}
