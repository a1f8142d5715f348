use artifact_gate::domain::models::Policy;
use artifact_gate::services::config::{SigningEnv, Workspace};
use artifact_gate::services::output::print_verdict;
use artifact_gate::services::{deps, scanner, spec_gate, verifier};
use std::path::Path;

pub fn verify_spec(json: bool, spec: &Path) -> anyhow::Result<i32> {
    print_verdict(json, &spec_gate::verify_spec(spec)?)
}

pub fn verify_sig(
    json: bool,
    artifact: &Path,
    pubkey: Option<&Path>,
    env: &SigningEnv,
) -> anyhow::Result<i32> {
    print_verdict(json, &verifier::verify_signature(artifact, pubkey, env)?)
}

pub fn check_deps(
    json: bool,
    target: &Path,
    policy: &Policy,
    workspace: &Workspace,
) -> anyhow::Result<i32> {
    print_verdict(json, &deps::check_dependencies(target, policy, workspace)?)
}

pub fn scan_tests(
    json: bool,
    target: &Path,
    policy: &Policy,
    workspace: &Workspace,
) -> anyhow::Result<i32> {
    print_verdict(json, &scanner::scan_test(target, policy, workspace)?)
}
