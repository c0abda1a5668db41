//! Import tracking and best-effort call-name resolution.
//!
//! Resolution through an alias map cannot be made sound without full
//! semantic analysis (reassigned values, dynamic attributes). A `None`
//! from [`resolve_call_name`] means "cannot classify", never "no issue".

use std::collections::HashMap;

use tree_sitter::Node;

fn text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

/// Maps locally bound names to their fully-qualified import origins.
///
/// Built incrementally as import statements are visited, top to bottom.
/// An import appearing after its use is not resolved for that use.
#[derive(Debug, Default)]
pub struct ImportMap {
    names: HashMap<String, String>,
}

impl ImportMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, local: impl Into<String>, origin: impl Into<String>) {
        self.names.insert(local.into(), origin.into());
    }

    pub fn resolve(&self, local: &str) -> Option<&str> {
        self.names.get(local).map(String::as_str)
    }

    /// Record bindings from `import a.b` / `import a.b as c`.
    pub fn record_import(&mut self, node: Node, source: &[u8]) {
        let mut cursor = node.walk();
        for name_node in node.children_by_field_name("name", &mut cursor) {
            match name_node.kind() {
                "aliased_import" => {
                    let origin = name_node.child_by_field_name("name");
                    let alias = name_node.child_by_field_name("alias");
                    if let (Some(origin), Some(alias)) = (origin, alias) {
                        self.insert(text(alias, source), text(origin, source));
                    }
                }
                "dotted_name" => {
                    let origin = text(name_node, source);
                    self.insert(origin, origin);
                }
                _ => {}
            }
        }
    }

    /// Record bindings from `from m import a, b as c`.
    pub fn record_import_from(&mut self, node: Node, source: &[u8]) {
        let module = node
            .child_by_field_name("module_name")
            .map(|m| text(m, source))
            .unwrap_or("");

        let mut cursor = node.walk();
        for name_node in node.children_by_field_name("name", &mut cursor) {
            match name_node.kind() {
                "aliased_import" => {
                    let origin = name_node.child_by_field_name("name");
                    let alias = name_node.child_by_field_name("alias");
                    if let (Some(origin), Some(alias)) = (origin, alias) {
                        let qualified = format!("{}.{}", module, text(origin, source));
                        self.insert(text(alias, source), qualified);
                    }
                }
                "dotted_name" => {
                    let local = text(name_node, source);
                    self.insert(local, format!("{}.{}", module, local));
                }
                // wildcard imports bind nothing resolvable
                _ => {}
            }
        }
    }
}

/// Best-effort fully-qualified dotted name of a call's callee.
///
/// - A bare name goes through the alias map if bound, else stands as is.
/// - An attribute chain is walked to its root; an alias-map entry for the
///   root substitutes the qualified origin, with the remaining segments
///   re-joined in source order.
/// - Anything else (call results, subscripts, lambdas) is unresolvable.
pub fn resolve_call_name(call: Node, source: &[u8], imports: &ImportMap) -> Option<String> {
    let callee = call.child_by_field_name("function")?;
    match callee.kind() {
        "identifier" => {
            let name = text(callee, source);
            Some(imports.resolve(name).unwrap_or(name).to_string())
        }
        "attribute" => {
            let mut segments = Vec::new();
            let mut current = callee;
            while current.kind() == "attribute" {
                let attr = current.child_by_field_name("attribute")?;
                segments.push(text(attr, source));
                current = current.child_by_field_name("object")?;
            }
            if current.kind() != "identifier" {
                return None;
            }
            segments.reverse();
            let root = text(current, source);
            let base = imports.resolve(root).unwrap_or(root);
            Some(format!("{}.{}", base, segments.join(".")))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::{Parser, Tree};

    fn parse(source: &str) -> Tree {
        let mut parser = Parser::new();
        let language = tree_sitter_python::LANGUAGE.into();
        parser.set_language(&language).unwrap();
        parser.parse(source, None).unwrap()
    }

    fn first_node_of_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
        if node.kind() == kind {
            return Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        children
            .into_iter()
            .find_map(|child| first_node_of_kind(child, kind))
    }

    fn resolve_first_call(source: &str, imports: &ImportMap) -> Option<String> {
        let tree = parse(source);
        let call = first_node_of_kind(tree.root_node(), "call").expect("no call in source");
        resolve_call_name(call, source.as_bytes(), imports)
    }

    #[test]
    fn test_bare_name_unaliased() {
        let imports = ImportMap::new();
        assert_eq!(resolve_first_call("sleep(1)", &imports).unwrap(), "sleep");
    }

    #[test]
    fn test_bare_name_through_alias() {
        let mut imports = ImportMap::new();
        imports.insert("sleep", "time.sleep");
        assert_eq!(
            resolve_first_call("sleep(1)", &imports).unwrap(),
            "time.sleep"
        );
    }

    #[test]
    fn test_attribute_chain_literal() {
        let imports = ImportMap::new();
        assert_eq!(
            resolve_first_call("a.b.c()", &imports).unwrap(),
            "a.b.c"
        );
    }

    #[test]
    fn test_attribute_chain_aliased_root() {
        let mut imports = ImportMap::new();
        imports.insert("np", "numpy");
        assert_eq!(
            resolve_first_call("np.random.rand()", &imports).unwrap(),
            "numpy.random.rand"
        );
    }

    #[test]
    fn test_unresolvable_callees() {
        let imports = ImportMap::new();
        // Callee is a call result.
        assert_eq!(resolve_first_call("factory()()", &imports), None);
        // Callee is a subscript.
        assert_eq!(resolve_first_call("handlers[0]()", &imports), None);
    }

    #[test]
    fn test_record_import() {
        let source = "import time\nimport numpy as np\nimport os.path";
        let tree = parse(source);
        let mut imports = ImportMap::new();
        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() == "import_statement" {
                imports.record_import(child, source.as_bytes());
            }
        }
        assert_eq!(imports.resolve("time"), Some("time"));
        assert_eq!(imports.resolve("np"), Some("numpy"));
        assert_eq!(imports.resolve("os.path"), Some("os.path"));
        assert_eq!(imports.resolve("numpy"), None);
    }

    #[test]
    fn test_record_import_from() {
        let source = "from os import path as p\nfrom time import sleep";
        let tree = parse(source);
        let mut imports = ImportMap::new();
        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() == "import_from_statement" {
                imports.record_import_from(child, source.as_bytes());
            }
        }
        assert_eq!(imports.resolve("p"), Some("os.path"));
        assert_eq!(imports.resolve("sleep"), Some("time.sleep"));
    }
}
