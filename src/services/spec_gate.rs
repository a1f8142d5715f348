//! Binds the `spec_hash` declared in a spec's front matter to the hash of its
//! canonicalized body.

use crate::domain::constants::SPEC_HASH_PENDING;
use crate::domain::models::SpecHash;
use crate::domain::outcome::{Rejection, Verdict};
use crate::services::canonical::{front_matter_range, spec_hash, split_front_matter};
use crate::services::storage::{atomic_write, read_text};
use std::path::Path;

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Reads `spec_hash` from the front matter. `Err` carries a policy message for
/// front matter that is not a YAML mapping.
fn declared_spec_hash(text: &str) -> Result<Option<String>, String> {
    let (Some(front), _) = split_front_matter(text) else {
        return Ok(None);
    };
    let parsed: serde_yaml::Value = serde_yaml::from_str(front)
        .map_err(|e| format!("spec front matter YAML parse error: {e}"))?;
    let map = match parsed {
        serde_yaml::Value::Null => return Ok(None),
        serde_yaml::Value::Mapping(map) => map,
        _ => return Err("spec front matter must be a key/value mapping".to_string()),
    };
    match map.get("spec_hash") {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s.clone())),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err("spec_hash must be a scalar".to_string()),
    }
}

pub fn verify_spec(path: &Path) -> anyhow::Result<Verdict> {
    let text = read_text(path)?;
    let name = display_name(path);

    let declared = match declared_spec_hash(&text) {
        Ok(d) => d,
        Err(msg) => return Ok(Verdict::fail(Rejection::policy(msg))),
    };
    let computed = spec_hash(&text);

    match declared.as_deref() {
        None | Some("") | Some(SPEC_HASH_PENDING) => Ok(Verdict::fail(Rejection::policy(
            format!("spec {name} has no finalized spec_hash"),
        ))),
        Some(declared) if declared != computed => {
            Ok(Verdict::fail(Rejection::policy(format!(
                "spec hash mismatch for {name}: declared {declared}, computed {computed} (canonicalized)"
            ))))
        }
        Some(_) => Ok(Verdict::pass(format!("spec verified: {name}"))),
    }
}

pub fn hash_spec(path: &Path) -> anyhow::Result<SpecHash> {
    let text = read_text(path)?;
    Ok(SpecHash {
        file: path.to_path_buf(),
        spec_hash: spec_hash(&text),
        written: false,
    })
}

/// Returns `text` with `spec_hash: <hash>` set in its front matter, creating
/// the block when the document has none. The body is left untouched, so the
/// result hashes to the same value.
pub fn stamp_front_matter(text: &str, hash: &str) -> String {
    let line = format!("spec_hash: {hash}");
    let Some(range) = front_matter_range(text) else {
        return format!("---\n{line}\n---\n{text}");
    };

    let front = &text[range.clone()];
    let mut replaced = false;
    let mut lines: Vec<String> = front
        .split('\n')
        .map(|l| {
            let key = l.split(':').next().unwrap_or_default().trim_end();
            if !replaced && key == "spec_hash" && l.contains(':') {
                replaced = true;
                line.clone()
            } else {
                l.to_string()
            }
        })
        .collect();
    if !replaced {
        if front.is_empty() {
            lines = vec![line];
        } else {
            lines.push(line);
        }
    }

    format!(
        "{}{}{}",
        &text[..range.start],
        lines.join("\n"),
        &text[range.end..]
    )
}

pub fn write_spec_hash(path: &Path) -> anyhow::Result<SpecHash> {
    let text = read_text(path)?;
    let hash = spec_hash(&text);
    let stamped = stamp_front_matter(&text, &hash);
    if stamped != text {
        atomic_write(path, stamped.as_bytes())?;
        tracing::info!(spec = %path.display(), spec_hash = %hash, "spec_hash written");
    }
    Ok(SpecHash {
        file: path.to_path_buf(),
        spec_hash: hash,
        written: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::outcome::GateError;
    use tempfile::TempDir;

    fn spec_file(tmp: &TempDir, body: &str) -> std::path::PathBuf {
        let p = tmp.path().join("feature.md");
        std::fs::write(&p, body).unwrap();
        p
    }

    #[test]
    fn pending_always_fails() {
        let tmp = TempDir::new().unwrap();
        let p = spec_file(&tmp, "---\nspec_hash: pending\n---\n# Anything\n");
        let verdict = verify_spec(&p).unwrap();
        assert!(verdict
            .rejection()
            .unwrap()
            .message()
            .contains("no finalized spec_hash"));
    }

    #[test]
    fn missing_front_matter_is_not_finalized() {
        let tmp = TempDir::new().unwrap();
        let p = spec_file(&tmp, "# Spec without front matter\n");
        assert_eq!(verify_spec(&p).unwrap().exit_code(), 2);
    }

    #[test]
    fn matching_hash_passes() {
        let tmp = TempDir::new().unwrap();
        let body = "# Login\n\nUsers sign in.\n";
        let hash = spec_hash(body);
        let p = spec_file(&tmp, &format!("---\nspec_hash: {hash}\nowner: x\n---\n{body}"));
        assert!(matches!(verify_spec(&p).unwrap(), Verdict::Pass { .. }));
    }

    #[test]
    fn mismatch_reports_both_values() {
        let tmp = TempDir::new().unwrap();
        let declared = "a".repeat(64);
        let p = spec_file(&tmp, &format!("---\nspec_hash: {declared}\n---\n# Body\n"));
        let verdict = verify_spec(&p).unwrap();
        let msg = verdict.rejection().unwrap().message().to_string();
        assert!(msg.contains(&declared));
        assert!(msg.contains(&spec_hash("# Body\n")));
    }

    #[test]
    fn malformed_front_matter_is_a_policy_violation() {
        let tmp = TempDir::new().unwrap();
        let p = spec_file(&tmp, "---\nspec_hash: [unclosed\n---\n# Body\n");
        let verdict = verify_spec(&p).unwrap();
        assert_eq!(verdict.rejection().unwrap().code(), "POLICY_VIOLATION");
        assert!(verdict.rejection().unwrap().message().contains("YAML"));
    }

    #[test]
    fn missing_spec_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = verify_spec(&tmp.path().join("nope.md")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GateError>(),
            Some(GateError::NotFound(_))
        ));
    }

    #[test]
    fn write_then_verify_passes_and_survives_whitespace_churn() {
        let tmp = TempDir::new().unwrap();
        let p = spec_file(&tmp, "---\nspec_hash: pending\ntitle: Login\n---\n# Login\nBody\n");
        let written = write_spec_hash(&p).unwrap();
        assert!(written.written);
        assert!(matches!(verify_spec(&p).unwrap(), Verdict::Pass { .. }));

        let stamped = std::fs::read_to_string(&p).unwrap();
        assert!(stamped.contains("title: Login"));
        std::fs::write(&p, stamped.replace("Body\n", "Body   \r\n\n\n")).unwrap();
        assert!(matches!(verify_spec(&p).unwrap(), Verdict::Pass { .. }));
    }

    #[test]
    fn stamping_creates_or_extends_front_matter() {
        assert_eq!(
            stamp_front_matter("# Doc\n", "abc"),
            "---\nspec_hash: abc\n---\n# Doc\n"
        );
        assert_eq!(
            stamp_front_matter("---\ntitle: t\n---\n# Doc\n", "abc"),
            "---\ntitle: t\nspec_hash: abc\n---\n# Doc\n"
        );
        assert_eq!(
            stamp_front_matter("---\nspec_hash: old\n---\n# Doc\n", "abc"),
            "---\nspec_hash: abc\n---\n# Doc\n"
        );
    }

    #[test]
    fn stamping_is_idempotent() {
        let once = stamp_front_matter("# Doc\n", "abc");
        assert_eq!(stamp_front_matter(&once, "abc"), once);
    }

    #[test]
    fn hash_spec_matches_canonical_hash() {
        let tmp = TempDir::new().unwrap();
        let p = spec_file(&tmp, "---\nx: 1\n---\nhello  \n");
        let h = hash_spec(&p).unwrap();
        assert_eq!(h.spec_hash, spec_hash("hello\n"));
        assert!(!h.written);
    }
}
