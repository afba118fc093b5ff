//! CLI commands for sm-bump
//!
//! - **bump**: the full pipeline (discover, publish, re-vendor, bump versions)
//! - **latest**: print the latest upstream ESR release
//! - **apply-patches**: re-vendor the source from a local archive
//!
//! Commands take the resolved `Workspace` so the repository and config are
//! loaded once.

pub mod apply_patches;
pub mod bump;
pub mod latest;

pub use apply_patches::run_apply_patches;
pub use bump::run_bump;
pub use latest::run_latest;
