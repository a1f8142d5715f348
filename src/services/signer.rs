use crate::domain::constants::{PEM_MARKER, SIMULATED_KEY_ID, SIMULATED_SIG_PREFIX};
use crate::domain::models::{SignatureAlgo, SignatureBundle, SignatureMeta};
use crate::domain::outcome::GateError;
use crate::services::canonical::sha256_hex;
use crate::services::config::SigningEnv;
use crate::services::crypto;
use anyhow::Context;
use base64::Engine;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Path(PathBuf),
    Inline(String),
}

/// A value counts as a key source if it is an inline PEM or an existing path.
pub fn resolve_key_source(raw: Option<&str>) -> Option<KeySource> {
    let raw = raw?;
    if raw.trim().starts_with(PEM_MARKER) {
        return Some(KeySource::Inline(raw.to_string()));
    }
    let path = Path::new(raw);
    if path.exists() {
        return Some(KeySource::Path(path.to_path_buf()));
    }
    None
}

pub fn simulated_signature(payload: &[u8]) -> SignatureBundle {
    SignatureBundle {
        signature: format!("{}{}", SIMULATED_SIG_PREFIX, sha256_hex(payload)),
        signature_meta: SignatureMeta {
            key_id: SIMULATED_KEY_ID.to_string(),
            algo: SignatureAlgo::Unsigned,
        },
    }
}

/// Signs a canonical payload.
///
/// In a controlled environment a missing key (or a build without crypto)
/// is a [`GateError::FailClosed`] and nothing is signed. Elsewhere the same
/// condition downgrades to a simulated signature that no verifier accepts.
pub fn sign(payload: &[u8], env: &SigningEnv) -> anyhow::Result<SignatureBundle> {
    let source = resolve_key_source(env.signing_key.as_deref());

    if env.controlled && (!crypto::AVAILABLE || source.is_none()) {
        return Err(GateError::FailClosed(
            "controlled environment detected but a valid signing key or crypto support is missing"
                .to_string(),
        )
        .into());
    }

    let pem = match source {
        Some(KeySource::Inline(pem)) => Some(pem),
        Some(KeySource::Path(path)) => Some(
            std::fs::read_to_string(&path)
                .with_context(|| format!("reading signing key {}", path.display()))?,
        ),
        None => None,
    };

    let Some(pem) = pem.filter(|_| crypto::AVAILABLE) else {
        tracing::warn!("no signing key available; emitting simulated signature");
        return Ok(simulated_signature(payload));
    };

    let raw = crypto::sign_pem(&pem, payload).map_err(|e| GateError::Signature(format!("{e:#}")))?;
    tracing::debug!(key_id = env.key_id(), "payload signed");
    Ok(SignatureBundle {
        signature: base64::engine::general_purpose::STANDARD.encode(raw),
        signature_meta: SignatureMeta {
            key_id: env.key_id().to_string(),
            algo: SignatureAlgo::Rs256,
        },
    })
}
