use artifact_gate::domain::models::Policy;
use artifact_gate::domain::outcome::exit;
use artifact_gate::services::artifacts::{make_artifact, ArtifactRequest};
use artifact_gate::services::config::{SigningEnv, Workspace};
use artifact_gate::services::output::print_one;
use artifact_gate::services::spec_gate::{hash_spec, write_spec_hash};
use std::path::Path;

pub fn make(
    json: bool,
    request: ArtifactRequest,
    policy: &Policy,
    workspace: &Workspace,
    env: &SigningEnv,
) -> anyhow::Result<i32> {
    let receipt = make_artifact(request, policy, workspace, env)?;
    print_one(json, receipt, |r| {
        format!(
            "[INFO] artifact signed & created: {} [{}]",
            r.path.display(),
            r.algo.as_str()
        )
    })?;
    Ok(exit::OK)
}

pub fn hash(json: bool, file: &Path, write: bool) -> anyhow::Result<i32> {
    let hashed = if write {
        write_spec_hash(file)?
    } else {
        hash_spec(file)?
    };
    print_one(json, hashed, |h| {
        if h.written {
            format!(
                "[INFO] SHA256: {} (written to {})",
                h.spec_hash,
                h.file.display()
            )
        } else {
            format!("[INFO] SHA256: {}", h.spec_hash)
        }
    })?;
    Ok(exit::OK)
}
