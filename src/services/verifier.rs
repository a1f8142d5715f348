use crate::domain::constants::SIMULATED_SIG_PREFIX;
use crate::domain::models::SignatureAlgo;
use crate::domain::outcome::{GateError, Rejection, Verdict};
use crate::services::canonical::canonicalize_structured;
use crate::services::config::SigningEnv;
use crate::services::crypto;
use crate::services::storage::read_text;
use anyhow::Context;
use base64::Engine;
use serde_json::Value;
use std::path::{Path, PathBuf};

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Object(m) => m.is_empty(),
        _ => false,
    }
}

fn resolve_public_key(explicit: Option<&Path>, env: &SigningEnv) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| env.verify_key.clone())
        .filter(|p| p.exists())
}

/// Checks an artifact file's signature against a public key.
///
/// Signature fields are stripped, the remaining object is canonicalized the
/// same way it was at signing time, and RSA-PSS/SHA-256 is verified over it.
/// A mismatch is a [`Verdict::Fail`]; a missing key outside a controlled
/// environment is [`Verdict::Skipped`].
pub fn verify_signature(
    artifact: &Path,
    pubkey: Option<&Path>,
    env: &SigningEnv,
) -> anyhow::Result<Verdict> {
    if !artifact.exists() {
        return Err(GateError::NotFound(artifact.to_path_buf()).into());
    }
    let name = artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| artifact.display().to_string());

    let Some(key_path) = resolve_public_key(pubkey, env) else {
        if env.controlled {
            return Err(GateError::FailClosed(
                "controlled environment is missing a public key for verification".to_string(),
            )
            .into());
        }
        tracing::warn!(artifact = %name, "no public key provided; skipping crypto verification");
        return Ok(Verdict::Skipped {
            reason: "no public key provided".to_string(),
        });
    };

    if !crypto::AVAILABLE {
        return Err(GateError::FailClosed(
            "signature verification requires a build with the `signing` feature".to_string(),
        )
        .into());
    }

    let raw = read_text(artifact)?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("parsing artifact {}", artifact.display()))?;
    let Value::Object(mut fields) = value else {
        return Ok(Verdict::fail(Rejection::signature(format!(
            "{name} is not a JSON object"
        ))));
    };

    let signature = fields.remove("signature").filter(|v| !is_blank(v));
    let meta = fields.remove("signature_meta").filter(|v| !is_blank(v));
    let (Some(signature), Some(meta)) = (signature, meta) else {
        return Ok(Verdict::fail(Rejection::signature(format!(
            "{name} is missing signature fields"
        ))));
    };

    let unsigned = meta.get("algo").and_then(Value::as_str) == Some(SignatureAlgo::Unsigned.as_str());
    if unsigned {
        return Ok(Verdict::fail(Rejection::signature(format!(
            "{name} uses an insecure simulated signature"
        ))));
    }

    let decoded = signature
        .as_str()
        .filter(|s| !s.starts_with(SIMULATED_SIG_PREFIX))
        .and_then(|s| base64::engine::general_purpose::STANDARD.decode(s).ok());
    let Some(decoded) = decoded else {
        return Ok(Verdict::fail(Rejection::signature(format!(
            "{name} carries an undecodable signature"
        ))));
    };

    let payload = canonicalize_structured(&Value::Object(fields));
    let pem = std::fs::read_to_string(&key_path)
        .with_context(|| format!("reading public key {}", key_path.display()))?;

    if crypto::verify_pem(&pem, &payload, &decoded)? {
        tracing::info!(artifact = %name, key = %key_path.display(), "signature verified");
        Ok(Verdict::pass(format!("signature verified: {name}")))
    } else {
        Ok(Verdict::fail(Rejection::signature(format!(
            "invalid signature for {name}"
        ))))
    }
}
