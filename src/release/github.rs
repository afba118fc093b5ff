//! GitHub release operations via the gh CLI

use super::{NewRelease, ReleaseHost};
use crate::core::error::{BumpError, BumpResult, ReleaseError};
use std::path::PathBuf;
use std::process::{Command, Output};

/// Release host backed by `gh release`
pub struct GhCli {
  /// Executable to run, `gh` from PATH
  program: PathBuf,
  /// `owner/name` of the repository releases live in
  repo: String,
  /// Directory gh runs in (asset paths are resolved against it)
  work_dir: PathBuf,
}

impl GhCli {
  pub fn new(repo: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
    Self {
      program: PathBuf::from("gh"),
      repo: repo.into(),
      work_dir: work_dir.into(),
    }
  }

  fn gh(&self, args: &[String]) -> BumpResult<Output> {
    tracing::debug!(args = ?args, "running gh");
    Command::new(&self.program)
      .current_dir(&self.work_dir)
      .args(args)
      .output()
      .map_err(|e| {
        BumpError::Release(ReleaseError::ToolMissing {
          tool: "gh".to_string(),
          reason: e.to_string(),
        })
      })
  }
}

/// Whether gh's diagnostic means the release simply does not exist
pub(crate) fn is_not_found(stderr: &str) -> bool {
  let lower = stderr.to_lowercase();
  lower.contains("release not found") || lower.contains("http 404")
}

impl ReleaseHost for GhCli {
  fn release_exists(&self, name: &str) -> BumpResult<bool> {
    let args = vec![
      "release".to_string(),
      "view".to_string(),
      name.to_string(),
      "--repo".to_string(),
      self.repo.clone(),
    ];
    let output = self.gh(&args)?;

    if output.status.success() {
      return Ok(true);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    if is_not_found(&stderr) {
      tracing::debug!(release = name, "release not found");
      return Ok(false);
    }

    Err(BumpError::Release(ReleaseError::QueryFailed {
      release: name.to_string(),
      stderr: stderr.trim().to_string(),
    }))
  }

  fn create_release(&self, release: &NewRelease) -> BumpResult<()> {
    let mut args = vec!["release".to_string(), "create".to_string(), release.name.clone()];
    args.extend(release.assets.iter().map(|p| p.to_string_lossy().to_string()));
    args.extend([
      "--repo".to_string(),
      self.repo.clone(),
      "--title".to_string(),
      release.title.clone(),
      "--notes".to_string(),
      release.notes.clone(),
    ]);

    let output = self.gh(&args)?;
    if !output.status.success() {
      return Err(BumpError::Release(ReleaseError::CreateFailed {
        release: release.name.clone(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }

    Ok(())
  }
}
