pub mod system_git;
mod system_git_ops;

pub use system_git::SystemGit;

use crate::core::error::BumpResult;
use std::path::Path;

/// Version-control operations the bump pipeline commits through.
///
/// Every commit is signed off. Paths are relative to the repository root or
/// absolute inside it.
pub trait VersionControl {
  /// Stage specific paths
  fn add(&self, paths: &[&Path]) -> BumpResult<()>;

  /// Stage every change in the working tree, including deletions
  fn add_all(&self) -> BumpResult<()>;

  /// Commit the index with `--signoff`
  fn commit(&self, message: &str) -> BumpResult<()>;
}
