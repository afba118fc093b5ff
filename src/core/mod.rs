//! Core engine for sm-bump
//!
//! - **bump**: the staged security-bump pipeline
//! - **config**: optional `sm-bump.toml` parsing and validation
//! - **context**: repository root plus config threaded through every stage
//! - **error**: error types with exit codes and help hints
//! - **vcs**: Git operations abstraction (SystemGit)

pub mod bump;
pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
