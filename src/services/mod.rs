//! Service layer containing gate logic and side-effect helpers.
//!
//! ## Service map
//! - `canonical.rs`: canonical JSON and spec bytes, sha256 helpers.
//! - `crypto.rs`: RSA-PSS primitives behind the `signing` feature.
//! - `signer.rs`: key resolution, signing, simulated fallback, fail-closed.
//! - `verifier.rs`: artifact signature verification.
//! - `spec_gate.rs`: spec_hash verification and stamping.
//! - `extract/`: per-language import/call extraction.
//! - `lockfile.rs`: declared package names from lock files.
//! - `deps.rs`: dependency allow-list and lock-file gate.
//! - `scanner.rs`: test-file banned/restricted scan.
//! - `artifacts.rs`: artifact assembly and persistence.
//! - `policy.rs`: policy document loading.
//! - `config.rs`: workspace layout and signing environment.
//! - `storage.rs`: atomic writes and reads.
//! - `output.rs`: JSON/text output helpers.
//!
//! ## Conventions
//! - Expected gate outcomes are `Verdict`s; faults are errors.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod artifacts;
pub mod canonical;
pub mod config;
pub mod crypto;
pub mod deps;
pub mod extract;
pub mod lockfile;
pub mod output;
pub mod policy;
pub mod scanner;
pub mod signer;
pub mod spec_gate;
pub mod storage;
pub mod verifier;

