use crate::domain::models::{IncidentReport, Policy};
use crate::domain::outcome::{Rejection, Verdict};
use crate::services::config::Workspace;
use crate::services::extract::{extract_file, Extracted};
use crate::services::storage::write_json_compact;
use std::collections::BTreeSet;
use std::path::Path;

/// Scans a test file for banned modules, banned calls and restricted modules.
///
/// Unlike the dependency gate, relative imports count too: a test that
/// reaches a banned module through a local shim is still caught.
pub fn scan_test(source: &Path, policy: &Policy, workspace: &Workspace) -> anyhow::Result<Verdict> {
    let Extracted { facts, .. } = match extract_file(source)? {
        Ok(extracted) => extracted,
        Err(rejection) => return Ok(Verdict::fail(rejection)),
    };
    let rules = &policy.security_rules;

    let mut banned: Vec<String> = Vec::new();
    let mut restricted: BTreeSet<String> = BTreeSet::new();
    for import in &facts.imports {
        if rules.test_banned_modules.contains(&import.module) {
            banned.push(import.module.clone());
        }
        if rules.test_restricted_modules.contains(&import.module) {
            restricted.insert(import.module.clone());
        }
    }
    banned.extend(
        facts
            .calls
            .iter()
            .filter(|c| rules.test_banned_calls.contains(*c))
            .map(|c| format!("Call:{c}")),
    );

    if !banned.is_empty() {
        let unique: BTreeSet<&String> = banned.iter().collect();
        let message = format!("banned modules/calls detected: {unique:?}");
        let report_path = workspace
            .incidents_dir()
            .join(format!("banned_{}.json", chrono::Utc::now().timestamp()));
        let report = IncidentReport {
            violations: banned,
            file: source.display().to_string(),
        };
        write_json_compact(&report_path, &report)?;
        tracing::info!(report = %report_path.display(), "incident report written");
        return Ok(Verdict::fail(Rejection::policy_with_report(
            message,
            report_path,
        )));
    }

    if !restricted.is_empty() {
        let findings: Vec<String> = restricted.into_iter().collect();
        tracing::warn!(file = %source.display(), modules = ?findings, "restricted modules in test");
        return Ok(Verdict::Warn {
            message: format!("restricted modules detected: {findings:?}"),
            findings,
        });
    }

    Ok(Verdict::pass(format!("test clean: {}", source.display())))
}
