//! Shared data model layer (structs/constants only).
//!
//! ## Files
//! - `models.rs`: artifact, policy and report structs.
//! - `outcome.rs`: verdicts, rejections and exit-status mapping.
//! - `constants.rs`: environment variable names, sentinels, default paths.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem/network side effects.
//!
//! ## Compatibility note
//! Artifact and report field names are a wire format read by independent
//! verifiers. Keep schema-impacting changes explicit.

pub mod constants;
pub mod models;
pub mod outcome;
