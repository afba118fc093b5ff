//! Workspace context - resolve once, pass everywhere
//!
//! The bump touches a fixed set of files relative to the repository root.
//! `Workspace` carries that root and the loaded config through every stage so
//! nothing depends on the process working directory.

use crate::core::config::BumpConfig;
use std::path::{Path, PathBuf};

/// Repository root plus configuration for one bump run.
#[derive(Debug, Clone)]
pub struct Workspace {
  /// Repository working tree root (absolute path)
  pub root: PathBuf,

  /// Loaded configuration (defaults when no file exists)
  pub config: BumpConfig,
}

impl Workspace {
  /// Build a workspace for a resolved repository root
  pub fn new(root: impl Into<PathBuf>, config: BumpConfig) -> Self {
    Self {
      root: root.into(),
      config,
    }
  }

  pub fn tracking_file(&self) -> PathBuf {
    self.root.join(&self.config.paths.tracking_file)
  }

  pub fn primary_manifest(&self) -> PathBuf {
    self.root.join(&self.config.paths.primary_manifest)
  }

  pub fn dependent_manifest(&self) -> PathBuf {
    self.root.join(&self.config.paths.dependent_manifest)
  }

  pub fn source_dir(&self) -> PathBuf {
    self.root.join(&self.config.paths.source_dir)
  }

  pub fn patches_dir(&self) -> PathBuf {
    self.root.join(&self.config.paths.patches_dir)
  }

  /// Where downloaded artifacts are staged (the repository root)
  pub fn staging_dir(&self) -> &Path {
    &self.root
  }
}
