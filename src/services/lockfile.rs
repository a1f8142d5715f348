//! Package names declared by ecosystem lock files.

use anyhow::Context;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

pub trait DeclaredPackages {
    /// Lower-cased package names declared by a lock file's contents.
    fn declared(&self, text: &str) -> anyhow::Result<BTreeSet<String>>;
}

/// `[[package]]` arrays of tables with a `name` key (Poetry, Cargo).
pub struct TomlPackageTable;

#[derive(Deserialize)]
struct LockDocument {
    #[serde(default)]
    package: Vec<LockedPackage>,
}

#[derive(Deserialize)]
struct LockedPackage {
    name: String,
}

impl DeclaredPackages for TomlPackageTable {
    fn declared(&self, text: &str) -> anyhow::Result<BTreeSet<String>> {
        let doc: LockDocument = toml::from_str(text).context("parsing lock file as TOML")?;
        Ok(doc
            .package
            .into_iter()
            .map(|p| p.name.to_lowercase())
            .collect())
    }
}

/// Line-oriented `name = "..."` scan for formats without a structured reader.
pub struct LineScan;

fn name_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^name = "([^"]+)""#)
            .unwrap_or_else(|e| unreachable!("lock name pattern is a constant: {e}"))
    })
}

impl DeclaredPackages for LineScan {
    fn declared(&self, text: &str) -> anyhow::Result<BTreeSet<String>> {
        Ok(name_line_re()
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_lowercase())
            .collect())
    }
}

pub fn provider_for(file_name: &str) -> &'static dyn DeclaredPackages {
    match file_name {
        "poetry.lock" | "Cargo.lock" => &TomlPackageTable,
        _ => &LineScan,
    }
}

/// Union of the names declared by every lock file in `names` that exists
/// under `root`. A lock file that cannot be read or parsed contributes
/// nothing and is logged.
pub fn declared_packages(root: &Path, names: &[&str]) -> BTreeSet<String> {
    let mut declared = BTreeSet::new();
    for name in names {
        let path = root.join(name);
        if !path.is_file() {
            continue;
        }
        let parsed = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))
            .and_then(|text| provider_for(name).declared(&text));
        match parsed {
            Ok(names) => {
                tracing::debug!(lock = %path.display(), packages = names.len(), "lock file read");
                declared.extend(names);
            }
            Err(e) => tracing::warn!(lock = %path.display(), "failed to parse lock file: {e:#}"),
        }
    }
    declared
}

/// Matches either the import name or its `_`→`-` spelling.
pub fn is_declared(declared: &BTreeSet<String>, import: &str) -> bool {
    let lower = import.to_lowercase();
    declared.contains(&lower) || declared.contains(&lower.replace('_', "-"))
}
