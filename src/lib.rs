//! Integrity and policy gates for AI-assisted development artifacts.
//!
//! The `artifact-gate` binary is a thin clap front-end over [`services`].

pub mod domain;
pub mod services;
