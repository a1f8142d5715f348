//! Stable names shared by the library and the CLI.

pub const SIGNING_KEY_ENV: &str = "AI_ARTIFACT_SIGNING_KEY";
pub const KEY_ID_ENV: &str = "AI_ARTIFACT_KEY_ID";
pub const VERIFY_KEY_ENV: &str = "AI_ARTIFACT_VERIFY_KEY";
pub const CONTROLLED_ENV_FLAG: &str = "CI";

pub const DEFAULT_KEY_ID: &str = "dev-local";
pub const SIMULATED_KEY_ID: &str = "simulated";
pub const SIMULATED_SIG_PREFIX: &str = "SIMULATED_SIG_";
pub const PEM_MARKER: &str = "-----BEGIN";

pub const SPEC_HASH_PENDING: &str = "pending";
pub const NULL_COMMIT: &str = "0000000000000000000000000000000000000000";
pub const UNKNOWN_POLICY_VERSION: &str = "unknown";
pub const SCAN_WARNING_PHASE: &str = "scan_warning";

pub const ARTIFACTS_DIR: &str = ".ai_artifacts";
pub const INCIDENTS_DIR: &str = "incidents";
pub const POLICY_PATH: &str = "tools/policy.yaml";
pub const FIRST_PARTY_DIR: &str = "src";
