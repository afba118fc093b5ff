//! Transient downloaded artifacts
//!
//! Everything downloaded during a bump is registered with a [`StagedArtifacts`]
//! guard before the first byte is written. Dropping the guard deletes the
//! files, so a failure anywhere in staging, publication or patching never
//! leaves archives behind in the working tree.

pub mod download;
pub mod remote;

pub use download::Downloader;
pub use remote::RemoteArtifacts;

use crate::core::error::BumpResult;
use crate::utils::remove_file_if_exists;
use std::path::PathBuf;

/// Where build and source artifacts come from
pub trait ArtifactStore {
  /// Download the fixed build artifact set for a changeset into `staging`
  fn stage_build_artifacts(&self, changeset: &str, staging: &mut StagedArtifacts) -> BumpResult<()>;

  /// Download one asset of a published release into `staging`
  fn fetch_release_asset(&self, release: &str, name: &str, staging: &mut StagedArtifacts) -> BumpResult<PathBuf>;
}

/// Scope guard owning downloaded files
#[derive(Debug)]
pub struct StagedArtifacts {
  dir: PathBuf,
  files: Vec<PathBuf>,
}

impl StagedArtifacts {
  /// Stage files into `dir`
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self {
      dir: dir.into(),
      files: Vec::new(),
    }
  }

  /// Register a file name and return the path to write it to
  pub fn register(&mut self, name: &str) -> PathBuf {
    let path = self.dir.join(name);
    if !self.files.contains(&path) {
      self.files.push(path.clone());
    }
    path
  }

  /// Registered files, in registration order
  pub fn files(&self) -> &[PathBuf] {
    &self.files
  }

  /// Delete every registered file now
  pub fn cleanup(&mut self) {
    for file in self.files.drain(..) {
      match remove_file_if_exists(&file) {
        Ok(true) => tracing::debug!(file = %file.display(), "removed staged artifact"),
        Ok(false) => {}
        Err(e) => tracing::warn!(file = %file.display(), error = %e, "failed to remove staged artifact"),
      }
    }
  }
}

impl Drop for StagedArtifacts {
  fn drop(&mut self) {
    self.cleanup();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_drop_removes_registered_files() {
    let dir = tempfile::tempdir().unwrap();
    let (a, b) = {
      let mut staging = StagedArtifacts::new(dir.path());
      let a = staging.register("mozjs.tar.xz");
      let b = staging.register("gcFunctions.txt.gz");
      std::fs::write(&a, b"a").unwrap();
      std::fs::write(&b, b"b").unwrap();
      assert_eq!(staging.files().len(), 2);
      (a, b)
    };
    assert!(!a.exists());
    assert!(!b.exists());
  }

  #[test]
  fn test_registered_but_never_written_is_fine() {
    let dir = tempfile::tempdir().unwrap();
    let mut staging = StagedArtifacts::new(dir.path());
    staging.register("allFunctions.txt.gz");
    staging.cleanup();
    assert!(staging.files().is_empty());
  }

  #[test]
  fn test_unregistered_files_survive() {
    let dir = tempfile::tempdir().unwrap();
    let keep = dir.path().join("Cargo.toml");
    std::fs::write(&keep, "[package]").unwrap();
    {
      let mut staging = StagedArtifacts::new(dir.path());
      let staged = staging.register("mozjs.tar.xz");
      std::fs::write(staged, b"xz").unwrap();
    }
    assert!(keep.exists());
  }

  #[test]
  fn test_register_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let mut staging = StagedArtifacts::new(dir.path());
    staging.register("mozjs.tar.xz");
    staging.register("mozjs.tar.xz");
    assert_eq!(staging.files(), &[dir.path().join("mozjs.tar.xz")]);
  }
}
