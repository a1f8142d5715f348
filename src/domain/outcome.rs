//! Expected outcomes vs. faults.
//!
//! A [`Verdict`] is what a gate decided: pass, advisory warning, skipped, or a
//! tagged [`Rejection`]. Anything that prevents a gate from deciding at all
//! (missing target, fail-closed configuration, broken key material, I/O)
//! travels on the `anyhow` error channel, optionally as a [`GateError`].

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

pub mod exit {
    pub const OK: i32 = 0;
    pub const INTERNAL: i32 = 1;
    pub const POLICY_VIOLATION: i32 = 2;
    pub const SIGNATURE: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const FAIL_CLOSED: i32 = 5;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    PolicyViolation {
        message: String,
        /// Report artifact written before rejecting, if any.
        report: Option<PathBuf>,
    },
    Signature {
        message: String,
    },
}

impl Rejection {
    pub fn policy(message: impl Into<String>) -> Self {
        Rejection::PolicyViolation {
            message: message.into(),
            report: None,
        }
    }

    pub fn policy_with_report(message: impl Into<String>, report: PathBuf) -> Self {
        Rejection::PolicyViolation {
            message: message.into(),
            report: Some(report),
        }
    }

    pub fn signature(message: impl Into<String>) -> Self {
        Rejection::Signature {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Rejection::PolicyViolation { message, .. } | Rejection::Signature { message } => {
                message
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Rejection::PolicyViolation { .. } => "POLICY_VIOLATION",
            Rejection::Signature { .. } => "SIGNATURE_INVALID",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Rejection::PolicyViolation { .. } => exit::POLICY_VIOLATION,
            Rejection::Signature { .. } => exit::SIGNATURE,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Pass { message: String },
    /// Advisory findings; the gate still passes.
    Warn { message: String, findings: Vec<String> },
    /// The check did not run (e.g. no verification key outside CI).
    Skipped { reason: String },
    Fail { rejection: Rejection },
}

impl Verdict {
    pub fn pass(message: impl Into<String>) -> Self {
        Verdict::Pass {
            message: message.into(),
        }
    }

    pub fn fail(rejection: Rejection) -> Self {
        Verdict::Fail { rejection }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Verdict::Fail { .. })
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Verdict::Fail { rejection } => Some(rejection),
            _ => None,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Verdict::Fail { rejection } => rejection.exit_code(),
            _ => exit::OK,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum GateError {
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("{0}")]
    FailClosed(String),
    #[error("signing failed: {0}")]
    Signature(String),
}

impl GateError {
    pub fn code(&self) -> &'static str {
        match self {
            GateError::NotFound(_) => "NOT_FOUND",
            GateError::FailClosed(_) => "FAIL_CLOSED",
            GateError::Signature(_) => "SIGNATURE_INVALID",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            GateError::NotFound(_) => exit::NOT_FOUND,
            GateError::FailClosed(_) => exit::FAIL_CLOSED,
            GateError::Signature(_) => exit::SIGNATURE,
        }
    }
}

/// Error code and exit status for anything on the fault channel.
pub fn classify(err: &anyhow::Error) -> (&'static str, i32) {
    match err.downcast_ref::<GateError>() {
        Some(g) => (g.code(), g.exit_code()),
        None => ("INTERNAL", exit::INTERNAL),
    }
}
