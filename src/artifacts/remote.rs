//! Taskcluster build artifacts and GitHub release assets

use super::{ArtifactStore, Downloader, StagedArtifacts};
use crate::core::config::{ReleaseConfig, TaskclusterConfig};
use crate::core::error::{BumpResult, ResultExt};
use std::path::PathBuf;

/// Artifact store backed by the Taskcluster index and GitHub releases
pub struct RemoteArtifacts {
  taskcluster: TaskclusterConfig,
  release: ReleaseConfig,
  /// Upstream repository name substituted into index namespaces
  upstream_repo: String,
  http: Downloader,
}

impl RemoteArtifacts {
  pub fn new(taskcluster: TaskclusterConfig, release: ReleaseConfig, upstream_repo: String, http: Downloader) -> Self {
    Self {
      taskcluster,
      release,
      upstream_repo,
      http,
    }
  }
}

impl ArtifactStore for RemoteArtifacts {
  fn stage_build_artifacts(&self, changeset: &str, staging: &mut StagedArtifacts) -> BumpResult<()> {
    for artifact in &self.taskcluster.artifacts {
      let url = self
        .taskcluster
        .artifact_url(artifact, &self.upstream_repo, changeset);
      let dest = staging.register(&artifact.name);
      println!("   ⬇️  {}", artifact.name);
      self
        .http
        .download_to(&url, &dest)
        .with_context(|| format!("Failed to download {} for changeset {}", artifact.name, changeset))?;
    }
    Ok(())
  }

  fn fetch_release_asset(&self, release: &str, name: &str, staging: &mut StagedArtifacts) -> BumpResult<PathBuf> {
    let url = self.release.asset_url(release, name);
    let dest = staging.register(name);
    println!("   ⬇️  {} (from {})", name, release);
    self
      .http
      .download_to(&url, &dest)
      .with_context(|| format!("Failed to download {} from release {}", name, release))?;
    Ok(dest)
  }
}
