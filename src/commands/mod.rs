//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `artifact.rs`: make-artifact and hash.
//! - `gates.rs`: verify-spec, verify-sig, check-deps, scan-tests.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate business logic to `services/*`.
//! - Handlers return the process exit status; faults propagate as errors.

pub mod artifact;
pub mod gates;

use crate::cli::{Cli, Commands};
use artifact_gate::services::artifacts::ArtifactRequest;
use artifact_gate::services::config::{SigningEnv, Workspace};
use artifact_gate::services::policy::load_policy;

pub fn workspace(cli: &Cli) -> Workspace {
    let mut workspace = Workspace::new(cli.root.clone());
    if let Some(dir) = &cli.artifacts_dir {
        workspace = workspace.with_artifacts_dir(dir.clone());
    }
    if let Some(path) = &cli.policy {
        workspace = workspace.with_policy_path(path.clone());
    }
    workspace
}

pub fn dispatch(cli: &Cli) -> anyhow::Result<i32> {
    let workspace = workspace(cli);
    let env = SigningEnv::from_env();
    let policy = load_policy(&workspace.policy_path);
    tracing::debug!(
        root = %workspace.root.display(),
        artifacts = %workspace.artifacts_dir.display(),
        controlled = env.controlled,
        "resolved configuration"
    );

    match &cli.command {
        Commands::MakeArtifact {
            feature,
            phase,
            owner,
            generator,
            spec_hash,
            spec_file,
            trace_id,
            metadata,
        } => {
            let request = ArtifactRequest {
                feature: feature.clone(),
                phase: phase.clone(),
                owner: owner.clone(),
                generator: generator.clone(),
                spec_hash: spec_hash.clone(),
                spec_file: spec_file.clone(),
                trace_id: trace_id.clone(),
                metadata: metadata.clone(),
            };
            artifact::make(cli.json, request, &policy, &workspace, &env)
        }
        Commands::Hash { file, write } => artifact::hash(cli.json, file, *write),
        Commands::VerifySpec { spec } => gates::verify_spec(cli.json, spec),
        Commands::VerifySig { artifact, pubkey } => {
            gates::verify_sig(cli.json, artifact, pubkey.as_deref(), &env)
        }
        Commands::CheckDeps { target } => gates::check_deps(cli.json, target, &policy, &workspace),
        Commands::ScanTests { target } => gates::scan_tests(cli.json, target, &policy, &workspace),
    }
}
