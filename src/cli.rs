//! Command-line interface for asyncheck.

use std::path::{Path, PathBuf};

use clap::Parser;
use walkdir::WalkDir;

use crate::analyzer::{self, AnalysisResult};
use crate::report::{self, ReportFormat};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ISSUES: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Directory name fragments excluded from scans by default.
const DEFAULT_EXCLUDES: &[&str] = &[
    "venv",
    ".venv",
    "__pycache__",
    ".git",
    ".tox",
    ".pytest_cache",
    "node_modules",
];

/// Static detector of async anti-patterns in Python code.
///
/// Asyncheck parses each Python file into a syntax tree and flags
/// blocking calls inside async functions, deprecated asyncio APIs,
/// unawaited coroutines, and unguarded gather() usage.
#[derive(Parser)]
#[command(name = "asyncheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Python file or directory to analyze
    pub path: PathBuf,

    /// Output format: json or markdown
    #[arg(short, long, default_value = "json")]
    pub format: String,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Extra path fragments to exclude from directory scans
    #[arg(long, num_args = 1..)]
    pub exclude: Vec<String>,
}

/// Collect Python files under `root`, excluded paths filtered out,
/// sorted lexically so reports are deterministic across runs.
pub fn collect_files(root: &Path, extra_excludes: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("py") {
            continue;
        }
        if is_excluded(path, extra_excludes) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

fn is_excluded(path: &Path, extra: &[String]) -> bool {
    let path_str = path.to_string_lossy();
    DEFAULT_EXCLUDES.iter().any(|p| path_str.contains(p))
        || extra.iter().any(|p| path_str.contains(p.as_str()))
}

/// Run the analysis and write the report.
pub fn run(args: &Cli) -> anyhow::Result<i32> {
    let format = match args.format.parse::<ReportFormat>() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let metadata = match std::fs::metadata(&args.path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let results: Vec<AnalysisResult> = if metadata.is_dir() {
        let files = collect_files(&args.path, &args.exclude)?;
        if files.is_empty() {
            eprintln!("Warning: no Python files to analyze");
        }
        files.iter().map(|f| analyzer::analyze_file(f)).collect()
    } else {
        vec![analyzer::analyze_file(&args.path)]
    };

    let rendered = report::render(&results, format)?;

    match &args.output {
        Some(out) => {
            std::fs::write(out, &rendered)?;
            println!("Report written to {}", out.display());
        }
        None => println!("{}", rendered),
    }

    let has_critical = results.iter().any(|r| r.critical_count() > 0);
    Ok(if has_critical {
        EXIT_ISSUES
    } else {
        EXIT_SUCCESS
    })
}
