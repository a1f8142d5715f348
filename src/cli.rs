use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "artifact-gate",
    version,
    about = "Sign, verify and policy-gate AI-generated artifacts"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        default_value = ".",
        help = "Project root holding src/, lock files and the artifacts directory"
    )]
    pub root: PathBuf,
    #[arg(
        long,
        global = true,
        help = "Policy document [default: <root>/tools/policy.yaml]"
    )]
    pub policy: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Artifact output directory [default: <root>/.ai_artifacts]"
    )]
    pub artifacts_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build, sign and write an artifact record
    MakeArtifact {
        #[arg(long)]
        feature: String,
        #[arg(long)]
        phase: String,
        #[arg(long, help = "Email address or GitHub handle")]
        owner: String,
        #[arg(long, default_value = "unknown")]
        generator: String,
        #[arg(long)]
        spec_hash: Option<String>,
        #[arg(long, help = "Spec whose canonical hash is recorded when --spec-hash is absent")]
        spec_file: Option<PathBuf>,
        #[arg(long, alias = "trace_id")]
        trace_id: Option<String>,
        #[arg(long, help = "JSON object stored under `metadata`")]
        metadata: Option<String>,
    },
    /// Check a spec's declared spec_hash against its canonical body
    VerifySpec { spec: PathBuf },
    /// Verify an artifact's RSA-PSS signature
    VerifySig {
        artifact: PathBuf,
        #[arg(long, help = "PEM public key [default: $AI_ARTIFACT_VERIFY_KEY]")]
        pubkey: Option<PathBuf>,
    },
    /// Check a source file's imports against the allow-list and lock file
    CheckDeps { target: PathBuf },
    /// Scan a test file for banned modules and calls
    ScanTests { target: PathBuf },
    /// Print the canonical spec hash of a file
    Hash {
        file: PathBuf,
        #[arg(long, help = "Stamp the hash into the file's front matter")]
        write: bool,
    },
}
