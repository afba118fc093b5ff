//! Upstream discovery and release publication
//!
//! # Flow
//!
//! 1. **Upstream**: read the ESR tag listing and pick the newest release tag
//! 2. **Host**: ask the release host whether `mozjs-source-<changeset>` exists
//! 3. **Publish**: create the release with the staged artifacts attached
//!
//! The release name is the idempotency key of the whole bump: once it exists,
//! every later run for the same changeset is a no-op.

pub mod github;
pub mod upstream;

pub use github::GhCli;
pub use upstream::{HgUpstream, UpstreamRelease, UpstreamSource};

use crate::core::error::BumpResult;
use std::path::PathBuf;

/// A release to create on the hosting platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRelease {
  /// Release (and tag) name, e.g. `mozjs-source-<changeset>`
  pub name: String,
  pub title: String,
  pub notes: String,
  /// Files uploaded as release assets
  pub assets: Vec<PathBuf>,
}

impl NewRelease {
  /// Describe the source snapshot release for an upstream revision
  pub fn source_snapshot(name: String, tag: &str, changeset: &str, revision_url: &str, assets: Vec<PathBuf>) -> Self {
    Self {
      name,
      title: format!("SpiderMonkey {}", tag),
      notes: format!(
        "Source code for SpiderMonkey {} (changeset: [{}]({}))",
        tag, changeset, revision_url
      ),
      assets,
    }
  }
}

/// Release hosting platform
pub trait ReleaseHost {
  /// Whether a release with this name exists
  ///
  /// "Not found" is `Ok(false)`; any other failure is an error.
  fn release_exists(&self, name: &str) -> BumpResult<bool>;

  /// Create a release and upload its assets
  fn create_release(&self, release: &NewRelease) -> BumpResult<()>;
}
