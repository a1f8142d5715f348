#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const GATE_ENV: [&str; 4] = [
    "CI",
    "AI_ARTIFACT_SIGNING_KEY",
    "AI_ARTIFACT_KEY_ID",
    "AI_ARTIFACT_VERIFY_KEY",
];

pub const POLICY: &str = r#"policy_version: "1.0"
dependency_rules:
  allowed_packages:
    requests: ">=2.31"
    PyYAML: "*"
security_rules:
  test_banned_modules: [socket, subprocess]
  test_restricted_modules: [requests]
  test_banned_calls: [eval, system]
"#;

/// An isolated project root with a policy and a first-party package.
pub struct TestEnv {
    _tmp: TempDir,
    pub root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().join("project");
        fs::create_dir_all(root.join("src/myapp")).expect("create first-party package");
        fs::create_dir_all(root.join("tools")).expect("create tools dir");
        fs::write(root.join("tools/policy.yaml"), POLICY).expect("write policy");
        Self { _tmp: tmp, root }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("artifact-gate");
        for name in GATE_ENV {
            cmd.env_remove(name);
        }
        cmd.current_dir(&self.root).env("RUST_LOG", "warn");
        cmd
    }

    pub fn write(&self, rel: &str, body: &str) -> PathBuf {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, body).expect("write fixture");
        path
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.root.join(".ai_artifacts")
    }

    pub fn read_json(&self, path: &Path) -> Value {
        let raw = fs::read_to_string(path).expect("read json file");
        serde_json::from_str(&raw).expect("valid json file")
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    /// Runs a command expected to exit with `code` and returns its JSON error envelope.
    pub fn run_json_failure(&self, args: &[&str], code: i32) -> Value {
        let out = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .code(code)
            .get_output()
            .stdout
            .clone();
        let value: Value = serde_json::from_slice(&out).expect("valid json output");
        assert_eq!(value["ok"], false);
        value
    }
}

#[cfg(feature = "signing")]
pub mod keys {
    use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
    use rsa::rand_core::OsRng;
    use rsa::RsaPrivateKey;
    use std::sync::OnceLock;

    pub struct KeyPair {
        pub private_pem: String,
        pub public_pem: String,
    }

    fn generate() -> KeyPair {
        let key = RsaPrivateKey::new(&mut OsRng, 1024).expect("generate rsa key");
        KeyPair {
            private_pem: key
                .to_pkcs8_pem(LineEnding::LF)
                .expect("encode private key")
                .as_str()
                .to_string(),
            public_pem: key
                .to_public_key()
                .to_public_key_pem(LineEnding::LF)
                .expect("encode public key"),
        }
    }

    pub fn primary() -> &'static KeyPair {
        static PAIR: OnceLock<KeyPair> = OnceLock::new();
        PAIR.get_or_init(generate)
    }

    pub fn other() -> &'static KeyPair {
        static PAIR: OnceLock<KeyPair> = OnceLock::new();
        PAIR.get_or_init(generate)
    }
}
