//! Context-tracking syntax tree visitor and the detection rules it fires.
//!
//! The visitor walks the tree depth-first in pre-order, carrying a stack
//! of function frames so the sync/async context survives arbitrary
//! nesting. The rules themselves are small checks over
//! (node, resolved call name, current context); what counts as wrong
//! lives in [`crate::kb`], not here.

use tree_sitter::Node;

use crate::analyzer::resolver::{resolve_call_name, ImportMap};
use crate::analyzer::types::{Issue, IssueType, Severity};
use crate::kb;

/// One level of function nesting.
struct Frame {
    name: String,
    is_async: bool,
}

/// Walks one file's tree and accumulates issues.
pub struct Visitor<'a> {
    file_path: &'a str,
    source: &'a [u8],
    lines: Vec<&'a str>,
    imports: ImportMap,
    stack: Vec<Frame>,
    issues: Vec<Issue>,
    async_functions: Vec<String>,
}

impl<'a> Visitor<'a> {
    pub fn new(file_path: &'a str, source: &'a str) -> Self {
        Self {
            file_path,
            source: source.as_bytes(),
            lines: source.split('\n').collect(),
            imports: ImportMap::new(),
            stack: Vec::new(),
            issues: Vec::new(),
            async_functions: Vec::new(),
        }
    }

    /// Consume the visitor after a full walk.
    pub fn finish(self) -> (Vec<Issue>, Vec<String>) {
        (self.issues, self.async_functions)
    }

    pub fn walk(&mut self, node: Node) {
        match node.kind() {
            "import_statement" => self.imports.record_import(node, self.source),
            "import_from_statement" => self.imports.record_import_from(node, self.source),
            "function_definition" => {
                self.visit_function(node);
                // frame handling visits the subtree itself
                return;
            }
            "call" => self.visit_call(node),
            "await" => self.visit_await(node),
            "assignment" => self.visit_assignment(node),
            "expression_statement" => self.visit_expression_statement(node),
            _ => {}
        }
        self.walk_children(node);
    }

    fn walk_children(&mut self, node: Node) {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        for child in children {
            self.walk(child);
        }
    }

    fn in_async_context(&self) -> bool {
        self.stack.last().is_some_and(|frame| frame.is_async)
    }

    fn current_function(&self) -> Option<&str> {
        self.stack.last().map(|frame| frame.name.as_str())
    }

    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn visit_function(&mut self, node: Node) {
        let is_async = node.child(0).is_some_and(|c| c.kind() == "async");
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();

        if is_async {
            self.async_functions.push(name.clone());
            if let Some(body) = node.child_by_field_name("body") {
                if body_is_single_pass(body) {
                    self.add_issue(
                        line_of(node),
                        IssueType::EmptyAsyncFunction,
                        Severity::Warning,
                        format!("async function '{}' has an empty body", name),
                        "remove the function or implement it".to_string(),
                    );
                }
            }
        }

        self.stack.push(Frame { name, is_async });
        self.walk_children(node);
        self.stack.pop();
    }

    fn visit_call(&mut self, node: Node) {
        let Some(call_name) = resolve_call_name(node, self.source, &self.imports) else {
            return;
        };

        if self.in_async_context() {
            self.check_blocking_call(node, &call_name);
        }
        self.check_deprecated_api(node, &call_name);
        if call_name.contains("gather") {
            self.check_gather_usage(node);
        }
    }

    /// Blocking operation invoked while the enclosing function is async.
    fn check_blocking_call(&mut self, node: Node, call_name: &str) {
        if let Some((_, replacement)) = kb::find_blocking(call_name) {
            let enclosing = self.current_function().unwrap_or("<module>").to_string();
            self.add_issue(
                line_of(node),
                IssueType::BlockingCallInAsync,
                Severity::Critical,
                format!(
                    "blocking call '{}' inside async function '{}'",
                    call_name, enclosing
                ),
                format!("use {} instead", replacement),
            );
        }
    }

    fn check_deprecated_api(&mut self, node: Node, call_name: &str) {
        if let Some(api) = kb::find_deprecated(call_name) {
            self.add_issue(
                line_of(node),
                IssueType::DeprecatedAsyncioApi,
                Severity::Warning,
                format!("deprecated API '{}'", call_name),
                format!("{}; use {} instead", api.reason, api.replacement),
            );
        }
    }

    /// `gather(...)` without `return_exceptions=True` loses sibling results
    /// on the first failure. The TaskGroup suggestion is emitted either way.
    fn check_gather_usage(&mut self, node: Node) {
        if !self.gather_has_return_exceptions(node) {
            self.add_issue(
                line_of(node),
                IssueType::GatherWithoutExceptionHandling,
                Severity::Warning,
                "asyncio.gather() called without return_exceptions=True".to_string(),
                "add return_exceptions=True or use asyncio.TaskGroup (Python 3.11+)".to_string(),
            );
        }
        self.add_issue(
            line_of(node),
            IssueType::ConsiderTaskgroup,
            Severity::Info,
            "consider asyncio.TaskGroup instead of gather".to_string(),
            "TaskGroup gives structured concurrency and automatic cleanup (Python 3.11+)"
                .to_string(),
        );
    }

    fn gather_has_return_exceptions(&self, node: Node) -> bool {
        let Some(args) = node.child_by_field_name("arguments") else {
            return false;
        };
        let mut cursor = args.walk();
        let result = args.children(&mut cursor).any(|child| {
            child.kind() == "keyword_argument"
                && child
                    .child_by_field_name("name")
                    .map(|n| self.text(n))
                    == Some("return_exceptions")
                && child.child_by_field_name("value").map(|v| v.kind()) == Some("true")
        });
        result
    }

    /// `await` applied to a call that exactly matches a blocking-table key:
    /// awaiting it does not make it non-blocking.
    fn visit_await(&mut self, node: Node) {
        let Some(operand) = node.named_child(0) else {
            return;
        };
        if operand.kind() != "call" {
            return;
        }
        let Some(call_name) = resolve_call_name(operand, self.source, &self.imports) else {
            return;
        };
        if let Some(replacement) = kb::lookup_blocking(&call_name) {
            self.add_issue(
                line_of(node),
                IssueType::AwaitingBlockingCall,
                Severity::Critical,
                format!("awaiting blocking call '{}'", call_name),
                format!("use {} instead", replacement),
            );
        }
    }

    /// Coroutine-looking call assigned but not awaited inside async code.
    fn visit_assignment(&mut self, node: Node) {
        let Some(right) = node.child_by_field_name("right") else {
            return;
        };
        if right.kind() != "call" {
            return;
        }
        let Some(call_name) = resolve_call_name(right, self.source, &self.imports) else {
            return;
        };
        if kb::is_coroutine_like(&call_name) && self.in_async_context() {
            self.add_issue(
                line_of(node),
                IssueType::UnawaitedCoroutine,
                Severity::Critical,
                format!("coroutine '{}' is created but never awaited", call_name),
                "add await or wrap it in asyncio.create_task()".to_string(),
            );
        }
    }

    /// Coroutine-looking call as a value-discarding statement, any context.
    fn visit_expression_statement(&mut self, node: Node) {
        let Some(expr) = node.named_child(0) else {
            return;
        };
        if expr.kind() != "call" {
            return;
        }
        let Some(call_name) = resolve_call_name(expr, self.source, &self.imports) else {
            return;
        };
        if kb::is_coroutine_like(&call_name) {
            self.add_issue(
                line_of(node),
                IssueType::BareCoroutineCall,
                Severity::Critical,
                format!("coroutine '{}' called without await", call_name),
                "prefix with await or use asyncio.create_task()".to_string(),
            );
        }
    }

    fn add_issue(
        &mut self,
        line: usize,
        issue_type: IssueType,
        severity: Severity,
        message: String,
        suggestion: String,
    ) {
        let original_code = line
            .checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .map(|l| l.trim().to_string())
            .unwrap_or_default();

        self.issues.push(Issue {
            file_path: self.file_path.to_string(),
            line,
            issue_type,
            severity,
            message,
            suggestion,
            original_code,
        });
    }
}

fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

fn body_is_single_pass(body: Node) -> bool {
    let mut cursor = body.walk();
    let statements: Vec<Node> = body
        .children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect();
    statements.len() == 1 && statements[0].kind() == "pass_statement"
}
