//! Rust front-end built on `syn`.
//!
//! Imports come from `use` trees, `extern crate`, and the leading segment of
//! qualified paths such as `serde_json::to_string`, since edition 2018 code
//! can name a dependency without importing it. Paths rooted at a module the
//! file declares itself are treated as relative, and paths rooted at a name a
//! `use` already bound (`use std::fmt;` then `fmt::Display`) are covered by
//! that `use`. Calls are the last segment
//! of a called path plus method names. Macro bodies are opaque token streams
//! and are not inspected.

use super::{ExtractError, SourceExtractor, SourceFacts};
use std::collections::BTreeSet;
use std::path::Path;
use syn::visit::{self, Visit};
use syn::UseTree;

const LANGUAGE: &str = "rust";

const RUST_STDLIB: &[&str] = &["alloc", "core", "proc_macro", "std", "test"];

const PRIMITIVES: &[&str] = &[
    "bool", "char", "f32", "f64", "i128", "i16", "i32", "i64", "i8", "isize", "str", "u128",
    "u16", "u32", "u64", "u8", "usize",
];

const RELATIVE_ROOTS: &[&str] = &["crate", "self", "super"];

pub struct RustExtractor;

impl SourceExtractor for RustExtractor {
    fn language(&self) -> &'static str {
        LANGUAGE
    }

    fn extract(&self, source: &str) -> Result<SourceFacts, ExtractError> {
        let file = syn::parse_file(source).map_err(|e| ExtractError::Syntax {
            language: LANGUAGE,
            detail: e.to_string(),
        })?;

        let mut collector = Collector::default();
        collector.visit_file(&file);
        Ok(collector.finish())
    }

    fn is_standard_library(&self, module: &str) -> bool {
        RUST_STDLIB.contains(&module) || PRIMITIVES.contains(&module)
    }

    fn is_first_party(&self, first_party_dir: &Path, module: &str) -> bool {
        first_party_dir.join(module).is_dir()
            || first_party_dir.join(format!("{module}.rs")).is_file()
    }

    fn lock_files(&self) -> &'static [&'static str] {
        &["Cargo.lock"]
    }
}

#[derive(Default)]
struct Collector {
    imports: Vec<String>,
    qualified: Vec<String>,
    local_modules: BTreeSet<String>,
    /// Names a `use` brings into scope.
    bindings: BTreeSet<String>,
    calls: Vec<String>,
}

impl Collector {
    fn use_tree(&mut self, tree: &UseTree) {
        match tree {
            UseTree::Path(p) => self.imports.push(p.ident.to_string()),
            UseTree::Name(n) => self.imports.push(n.ident.to_string()),
            UseTree::Rename(r) => self.imports.push(r.ident.to_string()),
            UseTree::Glob(_) => {}
            UseTree::Group(g) => {
                for item in &g.items {
                    self.use_tree(item);
                }
            }
        }
    }

    fn bind(&mut self, tree: &UseTree, parent: Option<&syn::Ident>) {
        match tree {
            UseTree::Path(p) => self.bind(&p.tree, Some(&p.ident)),
            UseTree::Name(n) if n.ident == "self" => {
                if let Some(parent) = parent {
                    self.bindings.insert(parent.to_string());
                }
            }
            UseTree::Name(n) => {
                self.bindings.insert(n.ident.to_string());
            }
            UseTree::Rename(r) => {
                self.bindings.insert(r.rename.to_string());
            }
            UseTree::Glob(_) => {}
            UseTree::Group(g) => {
                for item in &g.items {
                    self.bind(item, parent);
                }
            }
        }
    }

    fn finish(self) -> SourceFacts {
        let mut facts = SourceFacts::default();
        for name in self.imports {
            let relative = RELATIVE_ROOTS.contains(&name.as_str());
            facts.push_import(&name, relative);
        }
        for name in self.qualified {
            if self.bindings.contains(&name) {
                continue;
            }
            let relative = RELATIVE_ROOTS.contains(&name.as_str()) || self.local_modules.contains(&name);
            facts.push_import(&name, relative);
        }
        facts.calls = self.calls;
        facts
    }
}

fn looks_like_crate(ident: &str) -> bool {
    ident
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl<'ast> Visit<'ast> for Collector {
    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.use_tree(&node.tree);
        self.bind(&node.tree, None);
    }

    fn visit_item_extern_crate(&mut self, node: &'ast syn::ItemExternCrate) {
        self.imports.push(node.ident.to_string());
    }

    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        self.local_modules.insert(node.ident.to_string());
        visit::visit_item_mod(self, node);
    }

    fn visit_path(&mut self, node: &'ast syn::Path) {
        if node.segments.len() > 1 {
            if let Some(first) = node.segments.first() {
                let ident = first.ident.to_string();
                if looks_like_crate(&ident) {
                    self.qualified.push(ident);
                }
            }
        }
        visit::visit_path(self, node);
    }

    fn visit_expr_call(&mut self, node: &'ast syn::ExprCall) {
        if let syn::Expr::Path(p) = &*node.func {
            if let Some(last) = p.path.segments.last() {
                self.calls.push(last.ident.to_string());
            }
        }
        visit::visit_expr_call(self, node);
    }

    fn visit_expr_method_call(&mut self, node: &'ast syn::ExprMethodCall) {
        self.calls.push(node.method.to_string());
        visit::visit_expr_method_call(self, node);
    }
}
