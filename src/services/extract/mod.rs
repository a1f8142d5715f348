//! Language front-ends for the dependency and test-hygiene gates.
//!
//! Each extractor parses a source file into [`SourceFacts`]: the top-level
//! modules it imports and the names it calls. Gates decide what those facts
//! mean; extractors only report them. Adding a language means implementing
//! [`SourceExtractor`] and registering its file extensions in
//! [`extractor_for`].

pub mod python;
pub mod rust;
pub mod stdlib;

use crate::domain::outcome::Rejection;
use crate::services::storage::read_text;
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    /// Top-level component only: `os.path` is recorded as `os`.
    pub module: String,
    /// Package-relative (`from .x import y`, `use crate::x`).
    pub relative: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFacts {
    pub imports: Vec<ImportRef>,
    pub calls: Vec<String>,
}

impl SourceFacts {
    pub(crate) fn push_import(&mut self, dotted: &str, relative: bool) {
        let module = top_level(dotted);
        if module.is_empty() {
            return;
        }
        self.imports.push(ImportRef {
            module: module.to_string(),
            relative,
        });
    }

    pub fn absolute_imports(&self) -> BTreeSet<&str> {
        self.imports
            .iter()
            .filter(|i| !i.relative)
            .map(|i| i.module.as_str())
            .collect()
    }

    pub fn all_imports(&self) -> BTreeSet<&str> {
        self.imports.iter().map(|i| i.module.as_str()).collect()
    }
}

fn top_level(dotted: &str) -> &str {
    dotted
        .split(['.', ':'])
        .next()
        .unwrap_or_default()
        .trim()
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("{language} syntax error: {detail}")]
    Syntax {
        language: &'static str,
        detail: String,
    },
    #[error("{language} parser unavailable: {detail}")]
    Parser {
        language: &'static str,
        detail: String,
    },
}

pub trait SourceExtractor {
    fn language(&self) -> &'static str;

    fn extract(&self, source: &str) -> Result<SourceFacts, ExtractError>;

    fn is_standard_library(&self, module: &str) -> bool;

    /// Whether `module` is implemented inside the project's first-party tree.
    fn is_first_party(&self, first_party_dir: &Path, module: &str) -> bool {
        first_party_dir.join(module).exists()
    }

    /// Lock file names this ecosystem uses, looked up at the project root.
    fn lock_files(&self) -> &'static [&'static str];
}

pub fn extractor_for(path: &Path) -> Option<Box<dyn SourceExtractor>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("py" | "pyi") => Some(Box::new(python::PythonExtractor)),
        Some("rs") => Some(Box::new(rust::RustExtractor)),
        _ => None,
    }
}

pub struct Extracted {
    pub extractor: Box<dyn SourceExtractor>,
    pub facts: SourceFacts,
}

/// Reads and parses a source file for a gate.
///
/// The inner `Err` is a policy rejection (unsupported language or invalid
/// syntax): a file the gate cannot read is a file it cannot clear.
pub fn extract_file(path: &Path) -> anyhow::Result<Result<Extracted, Rejection>> {
    let source = read_text(path)?;
    let Some(extractor) = extractor_for(path) else {
        return Ok(Err(Rejection::policy(format!(
            "no source extractor for {}",
            path.display()
        ))));
    };
    match extractor.extract(&source) {
        Ok(facts) => Ok(Ok(Extracted { extractor, facts })),
        Err(e @ ExtractError::Syntax { .. }) => Ok(Err(Rejection::policy(format!(
            "{}: {e}",
            path.display()
        )))),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_extractor_by_extension() {
        assert_eq!(
            extractor_for(Path::new("a/b.py")).map(|e| e.language()),
            Some("python")
        );
        assert_eq!(
            extractor_for(Path::new("lib.rs")).map(|e| e.language()),
            Some("rust")
        );
        assert!(extractor_for(Path::new("README.md")).is_none());
        assert!(extractor_for(Path::new("Makefile")).is_none());
    }

    #[test]
    fn imports_keep_only_top_level_component() {
        let mut facts = SourceFacts::default();
        facts.push_import("os.path", false);
        facts.push_import("helpers", true);
        facts.push_import("", false);
        assert_eq!(facts.imports.len(), 2);
        assert_eq!(facts.absolute_imports(), BTreeSet::from(["os"]));
        assert_eq!(facts.all_imports(), BTreeSet::from(["os", "helpers"]));
    }

    #[test]
    fn extract_file_refuses_unknown_languages_and_bad_syntax() {
        let tmp = tempfile::TempDir::new().unwrap();
        let notes = tmp.path().join("notes.txt");
        std::fs::write(&notes, "import os").unwrap();
        let refused = extract_file(&notes).unwrap().err().unwrap();
        assert_eq!(refused.code(), "POLICY_VIOLATION");

        let broken = tmp.path().join("broken.py");
        std::fs::write(&broken, "def f(:\n").unwrap();
        let refused = extract_file(&broken).unwrap().err().unwrap();
        assert!(refused.message().contains("syntax error"));

        assert!(extract_file(&tmp.path().join("missing.py")).is_err());
    }
}
