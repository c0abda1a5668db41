//! Asyncheck - static detector of async anti-patterns in Python code.
//!
//! Asyncheck parses each Python file into a tree-sitter syntax tree and
//! walks it with a context-tracking visitor: a stack of function frames
//! records whether the current call site is inside an async function,
//! and an import-alias map resolves call names to their qualified
//! origins. Resolved names are matched against a static knowledge base
//! of blocking operations and deprecated asyncio APIs.
//!
//! # Architecture
//!
//! - `kb`: static tables of blocking calls, deprecated APIs, and
//!   coroutine naming hints (pure data)
//! - `analyzer`: the per-file pass - resolver, visitor, detection rules
//! - `report`: aggregation into JSON or Markdown output
//! - `cli`: file collection and the command-line front end
//!
//! Detection is heuristic by design: name resolution through an alias
//! map is best-effort, and the coroutine-likeness check is a keyword
//! match. The tool surfaces candidates for review; it is not a type
//! checker and does not execute code.

pub mod analyzer;
pub mod cli;
pub mod kb;
pub mod report;

pub use analyzer::{
    analyze_file, analyze_source, AnalysisResult, ImportMap, Issue, IssueType, Severity,
};
pub use report::{render, JsonReport, ReportFormat, Summary};
