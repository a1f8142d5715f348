use anyhow::Context;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes `content` to `path` through a sibling temp file and a rename, so a
/// reader never observes a partially written file. Permission bits of an
/// existing target are carried over on a best-effort basis.
pub fn atomic_write(path: &Path, content: &[u8]) -> anyhow::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)
        .with_context(|| format!("creating directory {}", parent.display()))?;

    // Dropping the temp file on any early return deletes it.
    let mut temp = tempfile::NamedTempFile::new_in(&parent)
        .with_context(|| format!("creating temp file in {}", parent.display()))?;
    temp.write_all(content)
        .with_context(|| format!("writing temp file for {}", path.display()))?;
    temp.as_file()
        .sync_all()
        .with_context(|| format!("syncing temp file for {}", path.display()))?;

    if let Ok(existing) = std::fs::metadata(path) {
        if let Err(e) = std::fs::set_permissions(temp.path(), existing.permissions()) {
            tracing::debug!(path = %path.display(), err = %e, "could not copy permissions");
        }
    }

    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("renaming temp file onto {}", path.display()))?;
    Ok(())
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    atomic_write(path, body.as_bytes())
}

pub fn write_json_compact<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let body = serde_json::to_string(value)?;
    atomic_write(path, body.as_bytes())
}

pub fn read_text(path: &Path) -> anyhow::Result<String> {
    if !path.exists() {
        return Err(crate::domain::outcome::GateError::NotFound(path.to_path_buf()).into());
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::outcome::GateError;
    use tempfile::TempDir;

    #[test]
    fn writes_and_creates_parents() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("a/b/out.txt");
        atomic_write(&target, b"test content").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "test content");
    }

    #[test]
    fn overwrite_leaves_no_temp_files() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("out.json");
        atomic_write(&target, b"one").unwrap();
        atomic_write(&target, b"two").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "two");
        let entries: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn keeps_existing_permission_bits() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("script.sh");
        std::fs::write(&target, "old").unwrap();
        std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o755)).unwrap();

        atomic_write(&target, b"new").unwrap();

        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn failed_rename_cleans_up_temp_file() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("occupied");
        std::fs::create_dir_all(target.join("child")).unwrap();

        assert!(atomic_write(&target, b"data").is_err());
        let entries: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn read_text_reports_missing_file_as_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = read_text(&tmp.path().join("missing.md")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GateError>(),
            Some(GateError::NotFound(_))
        ));
    }

    #[test]
    fn json_helpers_round_trip() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("r.json");
        write_json_pretty(&target, &serde_json::json!({"a": [1, 2]})).unwrap();
        let raw = std::fs::read_to_string(&target).unwrap();
        assert!(raw.contains("\n  \"a\""));
        write_json_compact(&target, &serde_json::json!({"a": 1})).unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), r#"{"a":1}"#);
    }
}
