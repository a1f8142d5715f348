use crate::domain::constants::UNKNOWN_POLICY_VERSION;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Serialize)]
pub struct JsonErr {
    pub ok: bool,
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Who owns an artifact. Serialized as `{"email": ..}` or `{"github": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Owner {
    Email(String),
    Github(String),
}

impl Owner {
    pub fn parse(raw: &str) -> Self {
        if raw.contains('@') {
            Owner::Email(raw.to_string())
        } else {
            Owner::Github(raw.to_string())
        }
    }
}

/// Unsigned artifact body. This is exactly what gets canonicalized and signed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub feature: String,
    pub phase: String,
    pub timestamp: String,
    pub policy_version: String,
    pub owner: Owner,
    pub spec_hash: String,
    pub commit_hash: String,
    pub generator: String,
    pub trace_id: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureAlgo {
    #[serde(rename = "RS256")]
    Rs256,
    /// Simulated signature; never verifiable.
    #[serde(rename = "NONE")]
    Unsigned,
}

impl SignatureAlgo {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgo::Rs256 => "RS256",
            SignatureAlgo::Unsigned => "NONE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureMeta {
    pub key_id: String,
    pub algo: SignatureAlgo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureBundle {
    pub signature: String,
    pub signature_meta: SignatureMeta,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignedArtifact {
    #[serde(flatten)]
    pub artifact: Artifact,
    pub signature: String,
    pub signature_meta: SignatureMeta,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Policy {
    #[serde(default = "default_policy_version", deserialize_with = "scalar_string")]
    pub policy_version: String,
    #[serde(default, deserialize_with = "nullable")]
    pub dependency_rules: DependencyRules,
    #[serde(default, deserialize_with = "nullable")]
    pub security_rules: SecurityRules,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            policy_version: default_policy_version(),
            dependency_rules: DependencyRules::default(),
            security_rules: SecurityRules::default(),
        }
    }
}

impl Policy {
    /// Case-insensitive allow-list lookup.
    pub fn allows_package(&self, name: &str) -> bool {
        let wanted = name.to_lowercase();
        self.dependency_rules
            .allowed_packages
            .keys()
            .any(|k| k.to_lowercase() == wanted)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DependencyRules {
    /// Package name to rule (usually a version constraint). Only the key is enforced.
    #[serde(default, deserialize_with = "nullable")]
    pub allowed_packages: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityRules {
    #[serde(default, deserialize_with = "scalar_set")]
    pub test_banned_modules: BTreeSet<String>,
    #[serde(default, deserialize_with = "scalar_set")]
    pub test_restricted_modules: BTreeSet<String>,
    #[serde(default, deserialize_with = "scalar_set")]
    pub test_banned_calls: BTreeSet<String>,
}

fn default_policy_version() -> String {
    UNKNOWN_POLICY_VERSION.to_string()
}

/// `key:` with no value in YAML means "empty", not "malformed".
fn nullable<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

fn scalar_text(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Policy authors write `policy_version: 1.2` as often as `"1.2"`.
fn scalar_string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(d)? {
        serde_yaml::Value::Null => Ok(default_policy_version()),
        other => scalar_text(&other).ok_or_else(|| {
            serde::de::Error::custom(format!("policy_version must be a scalar, got {other:?}"))
        }),
    }
}

/// Rule lists keep every scalar entry as text; nulls and nested values are
/// dropped instead of failing the whole policy.
fn scalar_set<'de, D>(d: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Vec<serde_yaml::Value> = nullable(d)?;
    Ok(items.iter().filter_map(scalar_text).collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyViolationReport {
    pub policy_violations: Vec<String>,
    pub lock_file_violations: Vec<String>,
    pub policy_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentReport {
    pub violations: Vec<String>,
    pub file: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactReceipt {
    pub path: PathBuf,
    pub feature: String,
    pub phase: String,
    pub key_id: String,
    pub algo: SignatureAlgo,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpecHash {
    pub file: PathBuf,
    pub spec_hash: String,
    pub written: bool,
}
