//! Process configuration: filesystem layout and signing environment.
//!
//! Both values are resolved once in `main` and passed down by reference.

use crate::domain::constants::{
    ARTIFACTS_DIR, CONTROLLED_ENV_FLAG, DEFAULT_KEY_ID, FIRST_PARTY_DIR, INCIDENTS_DIR,
    KEY_ID_ENV, POLICY_PATH, SIGNING_KEY_ENV, VERIFY_KEY_ENV,
};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub artifacts_dir: PathBuf,
    pub policy_path: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            artifacts_dir: root.join(ARTIFACTS_DIR),
            policy_path: root.join(POLICY_PATH),
            root,
        }
    }

    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }

    pub fn with_policy_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.policy_path = path.into();
        self
    }

    pub fn incidents_dir(&self) -> PathBuf {
        self.artifacts_dir.join(INCIDENTS_DIR)
    }

    /// Directory whose children count as internal (not third-party) modules.
    pub fn first_party_dir(&self) -> PathBuf {
        self.root.join(FIRST_PARTY_DIR)
    }
}

/// Signing-related environment, captured once.
#[derive(Debug, Clone, Default)]
pub struct SigningEnv {
    /// Path to a PEM private key, or the PEM itself.
    pub signing_key: Option<String>,
    pub key_id: Option<String>,
    pub verify_key: Option<PathBuf>,
    /// Automated/production run: unsigned output is unacceptable.
    pub controlled: bool,
}

impl SigningEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());
        Self {
            signing_key: non_empty(SIGNING_KEY_ENV),
            key_id: lookup(KEY_ID_ENV),
            verify_key: non_empty(VERIFY_KEY_ENV).map(PathBuf::from),
            controlled: lookup(CONTROLLED_ENV_FLAG)
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    pub fn key_id(&self) -> &str {
        self.key_id.as_deref().unwrap_or(DEFAULT_KEY_ID)
    }
}
