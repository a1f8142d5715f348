use crate::domain::constants::{NULL_COMMIT, SCAN_WARNING_PHASE, SPEC_HASH_PENDING};
use crate::domain::models::{Artifact, ArtifactReceipt, Owner, Policy, SignedArtifact};
use crate::services::canonical::{canonicalize_structured, sha256_hex};
use crate::services::config::{SigningEnv, Workspace};
use crate::services::signer::sign;
use crate::services::spec_gate::hash_spec;
use crate::services::storage::write_json_pretty;
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct ArtifactRequest {
    pub feature: String,
    pub phase: String,
    pub owner: String,
    pub generator: String,
    pub spec_hash: Option<String>,
    pub spec_file: Option<PathBuf>,
    pub trace_id: Option<String>,
    /// Raw JSON; must decode to an object.
    pub metadata: Option<String>,
}

/// Feature and phase become part of a file name.
fn validate_component(label: &str, value: &str) -> anyhow::Result<()> {
    let bad = value.is_empty()
        || value == "."
        || value == ".."
        || value
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_control());
    if bad {
        anyhow::bail!("{label} {value:?} cannot be used in an artifact file name");
    }
    Ok(())
}

fn parse_metadata(raw: Option<&str>) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
    let Some(raw) = raw else {
        return Ok(serde_json::Map::new());
    };
    match serde_json::from_str(raw).context("parsing --metadata as JSON")? {
        serde_json::Value::Object(map) => Ok(map),
        other => anyhow::bail!("--metadata must be a JSON object, got {other}"),
    }
}

/// HEAD of the repository at `root`, or the null commit when git is absent
/// or `root` is not a work tree.
pub fn head_commit(root: &Path) -> String {
    let output = std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(root)
        .output();
    let head = match output {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout).trim().to_string(),
        Ok(_) => String::new(),
        Err(e) => {
            tracing::debug!("git unavailable: {e}");
            String::new()
        }
    };
    if head.len() == 40 && head.chars().all(|c| c.is_ascii_hexdigit()) {
        head
    } else {
        NULL_COMMIT.to_string()
    }
}

fn derived_trace_id(now: DateTime<Utc>) -> String {
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros());
    sha256_hex(nanos.to_string().as_bytes())[..32].to_string()
}

fn artifact_file_name(feature: &str, phase: &str, now: DateTime<Utc>) -> String {
    if phase == SCAN_WARNING_PHASE {
        format!("{feature}.warning.{}.json", now.timestamp())
    } else {
        format!("{feature}.{phase}.json")
    }
}

/// Builds, signs and persists an artifact under the artifacts directory.
pub fn make_artifact(
    request: ArtifactRequest,
    policy: &Policy,
    workspace: &Workspace,
    env: &SigningEnv,
) -> anyhow::Result<ArtifactReceipt> {
    validate_component("feature", &request.feature)?;
    validate_component("phase", &request.phase)?;
    let metadata = parse_metadata(request.metadata.as_deref())?;

    let spec_hash = match (request.spec_hash, &request.spec_file) {
        (Some(hash), _) => hash,
        (None, Some(file)) => hash_spec(file)?.spec_hash,
        (None, None) => SPEC_HASH_PENDING.to_string(),
    };

    let now = Utc::now();
    let artifact = Artifact {
        feature: request.feature,
        phase: request.phase,
        timestamp: now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        policy_version: policy.policy_version.clone(),
        owner: Owner::parse(&request.owner),
        spec_hash,
        commit_hash: head_commit(&workspace.root),
        generator: request.generator,
        trace_id: request
            .trace_id
            .unwrap_or_else(|| derived_trace_id(now)),
        metadata,
    };

    let payload = canonicalize_structured(&serde_json::to_value(&artifact)?);
    let bundle = sign(&payload, env)?;

    let path = workspace
        .artifacts_dir
        .join(artifact_file_name(&artifact.feature, &artifact.phase, now));
    let receipt = ArtifactReceipt {
        path: path.clone(),
        feature: artifact.feature.clone(),
        phase: artifact.phase.clone(),
        key_id: bundle.signature_meta.key_id.clone(),
        algo: bundle.signature_meta.algo,
    };
    let signed = SignedArtifact {
        artifact,
        signature: bundle.signature,
        signature_meta: bundle.signature_meta,
    };
    write_json_pretty(&path, &signed)?;
    tracing::info!(
        path = %path.display(),
        algo = receipt.algo.as_str(),
        "artifact signed and written"
    );
    Ok(receipt)
}
