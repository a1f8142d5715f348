use crate::domain::models::{DependencyViolationReport, Policy};
use crate::domain::outcome::{Rejection, Verdict};
use crate::services::config::Workspace;
use crate::services::extract::{extract_file, Extracted};
use crate::services::lockfile::{declared_packages, is_declared};
use crate::services::storage::write_json_pretty;
use std::collections::BTreeSet;
use std::path::Path;

/// Reconciles a source file's third-party imports with the policy allow-list
/// and, when the project has one, its lock file.
///
/// Only absolute imports count. Standard-library modules and modules that
/// live under the first-party source directory are never third-party. On any
/// violation a report is written to `<artifacts>/<stem>.deps_violation.json`
/// before rejecting.
pub fn check_dependencies(
    source: &Path,
    policy: &Policy,
    workspace: &Workspace,
) -> anyhow::Result<Verdict> {
    let Extracted { extractor, facts } = match extract_file(source)? {
        Ok(extracted) => extracted,
        Err(rejection) => return Ok(Verdict::fail(rejection)),
    };

    let first_party = workspace.first_party_dir();
    let third_party: BTreeSet<&str> = facts
        .absolute_imports()
        .into_iter()
        .filter(|m| !extractor.is_standard_library(m))
        .filter(|m| !extractor.is_first_party(&first_party, m))
        .collect();
    tracing::debug!(
        file = %source.display(),
        language = extractor.language(),
        imports = ?third_party,
        "third-party imports"
    );

    let policy_violations: Vec<String> = third_party
        .iter()
        .filter(|m| !policy.allows_package(m))
        .map(|m| m.to_string())
        .collect();

    // An empty or unreadable lock file disables the lock check.
    let declared = declared_packages(&workspace.root, extractor.lock_files());
    let lock_file_violations: Vec<String> = if declared.is_empty() {
        Vec::new()
    } else {
        third_party
            .iter()
            .filter(|m| !is_declared(&declared, m))
            .map(|m| m.to_string())
            .collect()
    };

    if policy_violations.is_empty() && lock_file_violations.is_empty() {
        return Ok(Verdict::pass("dependencies clean"));
    }

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string());
    let report_path = workspace
        .artifacts_dir
        .join(format!("{stem}.deps_violation.json"));
    let message = format!(
        "dependency check failed. policy: {policy_violations:?}, lock: {lock_file_violations:?}"
    );
    let report = DependencyViolationReport {
        policy_violations,
        lock_file_violations,
        policy_version: policy.policy_version.clone(),
    };
    write_json_pretty(&report_path, &report)?;
    tracing::info!(report = %report_path.display(), "dependency violation report written");

    Ok(Verdict::fail(Rejection::policy_with_report(
        message,
        report_path,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::policy::parse_policy;
    use tempfile::TempDir;

    struct Project {
        tmp: TempDir,
        workspace: Workspace,
    }

    fn project() -> Project {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("src/myapp")).unwrap();
        let workspace = Workspace::new(tmp.path());
        Project { tmp, workspace }
    }

    impl Project {
        fn file(&self, rel: &str, body: &str) -> std::path::PathBuf {
            let p = self.tmp.path().join(rel);
            std::fs::write(&p, body).unwrap();
            p
        }

        fn report(&self, stem: &str) -> DependencyViolationReport {
            let p = self
                .workspace
                .artifacts_dir
                .join(format!("{stem}.deps_violation.json"));
            serde_json::from_str(&std::fs::read_to_string(p).unwrap()).unwrap()
        }
    }

    fn policy(allowed: &[&str]) -> Policy {
        let mut yaml = String::from("policy_version: '2.0'\ndependency_rules:\n  allowed_packages:\n");
        for name in allowed {
            yaml.push_str(&format!("    {name}: '*'\n"));
        }
        parse_policy(&yaml).unwrap()
    }

    #[test]
    fn allowed_stdlib_and_first_party_imports_pass() {
        let p = project();
        let target = p.file(
            "app.py",
            "import os\nimport requests\nfrom myapp.core import run\nfrom .local import x\n",
        );
        let verdict = check_dependencies(&target, &policy(&["Requests"]), &p.workspace).unwrap();
        assert!(matches!(verdict, Verdict::Pass { .. }), "{verdict:?}");
        assert!(!p.workspace.artifacts_dir.exists());
    }

    #[test]
    fn unlisted_import_writes_report_and_rejects() {
        let p = project();
        let target = p.file("app.py", "import numpy\nimport requests\n");
        let verdict = check_dependencies(&target, &policy(&["requests"]), &p.workspace).unwrap();
        let rejection = verdict.rejection().unwrap();
        assert_eq!(rejection.exit_code(), 2);
        assert!(rejection.message().contains("numpy"));

        let report = p.report("app");
        assert_eq!(report.policy_violations, vec!["numpy"]);
        assert!(report.lock_file_violations.is_empty());
        assert_eq!(report.policy_version, "2.0");
    }

    #[test]
    fn empty_policy_denies_every_third_party_import() {
        let p = project();
        let target = p.file("app.py", "import yaml\nimport json\n");
        let verdict = check_dependencies(&target, &Policy::default(), &p.workspace).unwrap();
        assert!(!verdict.is_success());
        assert_eq!(p.report("app").policy_violations, vec!["yaml"]);
    }

    #[test]
    fn lock_file_mismatch_is_reported_separately() {
        let p = project();
        p.file(
            "poetry.lock",
            "[[package]]\nname = \"typing-extensions\"\nversion = \"4\"\n",
        );
        let target = p.file("app.py", "import typing_extensions\nimport requests\n");
        let verdict = check_dependencies(
            &target,
            &policy(&["typing_extensions", "requests"]),
            &p.workspace,
        )
        .unwrap();
        assert!(!verdict.is_success());
        let report = p.report("app");
        assert!(report.policy_violations.is_empty());
        assert_eq!(report.lock_file_violations, vec!["requests"]);
    }

    #[test]
    fn empty_lock_file_skips_lock_check() {
        let p = project();
        p.file("poetry.lock", "[metadata]\nlock-version = \"2.0\"\n");
        let target = p.file("app.py", "import requests\n");
        let verdict = check_dependencies(&target, &policy(&["requests"]), &p.workspace).unwrap();
        assert!(verdict.is_success());
    }

    #[test]
    fn violations_are_sorted() {
        let p = project();
        let target = p.file("app.py", "import zlib_ng\nimport attrs\nimport flask\n");
        check_dependencies(&target, &Policy::default(), &p.workspace).unwrap();
        assert_eq!(
            p.report("app").policy_violations,
            vec!["attrs", "flask", "zlib_ng"]
        );
    }

    #[test]
    fn syntax_error_is_a_policy_violation() {
        let p = project();
        let target = p.file("app.py", "import (\n");
        let verdict = check_dependencies(&target, &Policy::default(), &p.workspace).unwrap();
        assert_eq!(verdict.exit_code(), 2);
        assert!(!p.workspace.artifacts_dir.exists());
    }

    #[test]
    fn rust_sources_use_cargo_lock() {
        let p = project();
        std::fs::write(p.tmp.path().join("src/cli.rs"), "").unwrap();
        p.file(
            "Cargo.lock",
            "version = 3\n\n[[package]]\nname = \"serde\"\nversion = \"1.0.0\"\n",
        );
        let target = p.file(
            "main.rs",
            "use std::fs;\nuse serde::Serialize;\nuse cli::run;\nfn main() { let _ = regex::Regex::new(\"x\"); }\n",
        );
        let verdict =
            check_dependencies(&target, &policy(&["serde", "regex"]), &p.workspace).unwrap();
        assert!(!verdict.is_success());
        let report = p.report("main");
        assert!(report.policy_violations.is_empty());
        assert_eq!(report.lock_file_violations, vec!["regex"]);
    }

    #[test]
    fn std_modules_named_through_use_pass() {
        let p = project();
        let target = p.file(
            "lib.rs",
            "use std::fmt;\nuse std::io;\nstruct X;\nimpl fmt::Display for X {\n    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, \"x\") }\n}\npub fn r() -> io::Result<()> { Ok(()) }\n",
        );
        let verdict = check_dependencies(&target, &policy(&["serde"]), &p.workspace).unwrap();
        assert!(matches!(verdict, Verdict::Pass { .. }), "{verdict:?}");
        assert!(!p.workspace.artifacts_dir.exists());
    }
}
