use crate::domain::models::Policy;
use std::path::Path;

/// Loads the policy document once per run.
///
/// An absent file yields the empty policy, which denies every third-party
/// import. A file that exists but does not parse also yields the empty
/// policy, with a warning, so a typo never silently widens the allow-list.
pub fn load_policy(path: &Path) -> Policy {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(policy = %path.display(), "policy file absent; using empty policy");
            return Policy::default();
        }
        Err(e) => {
            tracing::warn!(policy = %path.display(), "failed to read policy: {e}");
            return Policy::default();
        }
    };

    match parse_policy(&raw) {
        Ok(policy) => {
            tracing::debug!(
                policy = %path.display(),
                version = %policy.policy_version,
                allowed = policy.dependency_rules.allowed_packages.len(),
                "policy loaded"
            );
            policy
        }
        Err(e) => {
            tracing::warn!(policy = %path.display(), "failed to parse policy: {e}");
            Policy::default()
        }
    }
}

pub fn parse_policy(raw: &str) -> Result<Policy, serde_yaml::Error> {
    if raw.trim().is_empty() {
        return Ok(Policy::default());
    }
    serde_yaml::from_str(raw)
}
