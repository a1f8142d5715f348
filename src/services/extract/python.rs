use super::stdlib::is_python_stdlib;
use super::{ExtractError, SourceExtractor, SourceFacts};
use tree_sitter::{Node, Parser};

const LANGUAGE: &str = "python";

/// Python 2 statement forms the grammar still accepts; Python 3 rejects them.
const PY2_STATEMENTS: &[(&str, &str)] =
    &[("exec_statement", "exec"), ("print_statement", "print")];

pub struct PythonExtractor;

impl SourceExtractor for PythonExtractor {
    fn language(&self) -> &'static str {
        LANGUAGE
    }

    fn extract(&self, source: &str) -> Result<SourceFacts, ExtractError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ExtractError::Parser {
                language: LANGUAGE,
                detail: e.to_string(),
            })?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ExtractError::Parser {
                language: LANGUAGE,
                detail: "parse was cancelled".to_string(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error(root).map_or(1, |n| n.start_position().row + 1);
            return Err(ExtractError::Syntax {
                language: LANGUAGE,
                detail: format!("invalid syntax near line {line}"),
            });
        }

        let src = source.as_bytes();
        let mut facts = SourceFacts::default();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let py2 = PY2_STATEMENTS.iter().find(|(kind, _)| *kind == node.kind());
            if let Some((_, keyword)) = py2 {
                return Err(ExtractError::Syntax {
                    language: LANGUAGE,
                    detail: format!(
                        "missing parentheses in call to '{keyword}' near line {}",
                        node.start_position().row + 1
                    ),
                });
            }
            visit(node, src, &mut facts);
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
        Ok(facts)
    }

    fn is_standard_library(&self, module: &str) -> bool {
        is_python_stdlib(module)
    }

    fn lock_files(&self) -> &'static [&'static str] {
        &["poetry.lock", "pdm.lock", "uv.lock"]
    }
}

fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).filter(Node::has_error).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

fn text<'a>(node: Node<'_>, src: &'a [u8]) -> Option<&'a str> {
    node.utf8_text(src).ok()
}

fn visit(node: Node<'_>, src: &[u8], facts: &mut SourceFacts) {
    match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for name in node.children_by_field_name("name", &mut cursor) {
                let dotted = if name.kind() == "aliased_import" {
                    name.child_by_field_name("name")
                } else {
                    Some(name)
                };
                if let Some(module) = dotted.and_then(|n| text(n, src)) {
                    facts.push_import(module, false);
                }
            }
        }
        "import_from_statement" => {
            let Some(module) = node.child_by_field_name("module_name") else {
                return;
            };
            match module.kind() {
                "dotted_name" => {
                    if let Some(name) = text(module, src) {
                        facts.push_import(name, false);
                    }
                }
                // `from . import x` names no module; `from .pkg import x` does.
                "relative_import" => {
                    let mut cursor = module.walk();
                    let dotted = module
                        .named_children(&mut cursor)
                        .find(|n| n.kind() == "dotted_name");
                    if let Some(name) = dotted.and_then(|n| text(n, src)) {
                        facts.push_import(name, true);
                    }
                }
                _ => {}
            }
        }
        "future_import_statement" => facts.push_import("__future__", false),
        "call" => {
            let Some(function) = node.child_by_field_name("function") else {
                return;
            };
            let name = match function.kind() {
                "identifier" => text(function, src),
                "attribute" => function
                    .child_by_field_name("attribute")
                    .and_then(|a| text(a, src)),
                _ => None,
            };
            if let Some(name) = name {
                facts.calls.push(name.to_string());
            }
        }
        _ => {}
    }
}
