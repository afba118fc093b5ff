//! Replace the vendored SpiderMonkey source and re-apply local patches
//!
//! The vendored tree is thrown away and re-extracted from the release
//! archive on every bump; local changes live only as `*.patch` files that are
//! applied on top, in file-name order.

use crate::core::context::Workspace;
use crate::core::error::{BumpError, BumpResult, PatchError, ResultExt};
use crate::core::vcs::SystemGit;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Procedure that turns a source archive into the patched working tree
pub trait PatchApplier {
  fn apply(&self, archive: &Path) -> BumpResult<()>;
}

/// Extract-then-patch updater for the vendored source directory
pub struct SourceUpdater<'a> {
  git: &'a SystemGit,
  root: PathBuf,
  source_dir: PathBuf,
  patches_dir: PathBuf,
  strip_components: u32,
}

impl<'a> SourceUpdater<'a> {
  pub fn new(git: &'a SystemGit, workspace: &Workspace) -> Self {
    Self {
      git,
      root: workspace.root.clone(),
      source_dir: workspace.config.paths.source_dir.clone(),
      patches_dir: workspace.patches_dir(),
      strip_components: workspace.config.paths.strip_components,
    }
  }

  /// Remove and recreate the vendored directory, then unpack the archive
  fn extract(&self, archive: &Path) -> BumpResult<()> {
    let target = self.root.join(&self.source_dir);
    if target.exists() {
      fs::remove_dir_all(&target).with_context(|| format!("Failed to remove {}", target.display()))?;
    }
    fs::create_dir_all(&target).with_context(|| format!("Failed to create {}", target.display()))?;

    tracing::debug!(archive = %archive.display(), target = %target.display(), "extracting");
    let output = Command::new("tar")
      .arg("-xf")
      .arg(archive)
      .arg("-C")
      .arg(&target)
      .arg(format!("--strip-components={}", self.strip_components))
      .output()
      .map_err(|e| {
        BumpError::Patch(PatchError::Extract {
          archive: archive.to_path_buf(),
          stderr: format!("failed to run tar: {}", e),
        })
      })?;

    if !output.status.success() {
      return Err(BumpError::Patch(PatchError::Extract {
        archive: archive.to_path_buf(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }
    Ok(())
  }

  /// `*.patch` files in lexicographic order
  fn patch_files(&self) -> BumpResult<Vec<PathBuf>> {
    if !self.patches_dir.is_dir() {
      tracing::debug!(dir = %self.patches_dir.display(), "no patch directory");
      return Ok(Vec::new());
    }
    let pattern = self.patches_dir.join("*.patch");
    let mut patches = Vec::new();
    for entry in glob::glob(&pattern.to_string_lossy())? {
      patches.push(entry?);
    }
    patches.sort();
    Ok(patches)
  }
}

impl PatchApplier for SourceUpdater<'_> {
  fn apply(&self, archive: &Path) -> BumpResult<()> {
    self.extract(archive)?;

    let patches = self.patch_files()?;
    println!("   🩹 Applying {} patch(es)", patches.len());
    for patch in &patches {
      self.git.apply_patch(patch, &self.source_dir).map_err(|e| {
        BumpError::Patch(PatchError::Apply {
          patch: patch.clone(),
          stderr: e.to_string(),
        })
      })?;
      tracing::debug!(patch = %patch.display(), "applied");
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::config::BumpConfig;

  fn sh(dir: &Path, program: &str, args: &[&str]) {
    let output = Command::new(program).current_dir(dir).args(args).output().unwrap();
    assert!(
      output.status.success(),
      "{} {:?} failed: {}",
      program,
      args,
      String::from_utf8_lossy(&output.stderr)
    );
  }

  /// Repository with a vendored tree, a patch set and a source tarball
  fn fixture() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    sh(root, "git", &["init", "--initial-branch=main"]);

    // Stale vendored file that must disappear
    let vendored = root.join("mozjs-sys").join("mozjs");
    fs::create_dir_all(&vendored).unwrap();
    fs::write(vendored.join("stale.txt"), "old").unwrap();

    // Upstream source packaged under a top-level directory
    let pkg = root.join("pkg").join("mozjs-128.5.0").join("js");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(pkg.join("jsapi.h"), "#define A 1\n#define B 1\n").unwrap();
    sh(&root.join("pkg"), "tar", &["-czf", "../mozjs.tar.gz", "mozjs-128.5.0"]);
    fs::remove_dir_all(root.join("pkg")).unwrap();

    let patches = root.join("mozjs-sys").join("etc").join("patches");
    fs::create_dir_all(&patches).unwrap();
    fs::write(
      patches.join("0001-a.patch"),
      "--- a/js/jsapi.h\n+++ b/js/jsapi.h\n@@ -1,2 +1,2 @@\n-#define A 1\n+#define A 2\n #define B 1\n",
    )
    .unwrap();
    // Depends on 0001 having been applied first
    fs::write(
      patches.join("0002-b.patch"),
      "--- a/js/jsapi.h\n+++ b/js/jsapi.h\n@@ -1,2 +1,2 @@\n #define A 2\n-#define B 1\n+#define B 2\n",
    )
    .unwrap();

    let archive = root.join("mozjs.tar.gz");
    (dir, archive)
  }

  #[test]
  fn test_extract_and_apply_in_order() {
    let (dir, archive) = fixture();
    let git = SystemGit::open(dir.path()).unwrap();
    let ws = Workspace::new(git.work_tree().to_path_buf(), BumpConfig::default());

    SourceUpdater::new(&git, &ws).apply(&archive).unwrap();

    let header = fs::read_to_string(ws.source_dir().join("js").join("jsapi.h")).unwrap();
    assert_eq!(header, "#define A 2\n#define B 2\n");
    assert!(!ws.source_dir().join("stale.txt").exists());
  }

  #[test]
  fn test_failing_patch_names_the_file() {
    let (dir, archive) = fixture();
    fs::write(
      dir.path().join("mozjs-sys/etc/patches/0003-bad.patch"),
      "--- a/js/missing.h\n+++ b/js/missing.h\n@@ -1 +1 @@\n-x\n+y\n",
    )
    .unwrap();

    let git = SystemGit::open(dir.path()).unwrap();
    let ws = Workspace::new(git.work_tree().to_path_buf(), BumpConfig::default());
    let err = SourceUpdater::new(&git, &ws).apply(&archive).unwrap_err();

    match err {
      BumpError::Patch(PatchError::Apply { patch, .. }) => {
        assert!(patch.ends_with("0003-bad.patch"));
      }
      other => panic!("unexpected error: {}", other),
    }
  }

  #[test]
  fn test_missing_archive_is_extract_error() {
    let (dir, _) = fixture();
    let git = SystemGit::open(dir.path()).unwrap();
    let ws = Workspace::new(git.work_tree().to_path_buf(), BumpConfig::default());
    let err = SourceUpdater::new(&git, &ws)
      .apply(&dir.path().join("nope.tar.xz"))
      .unwrap_err();
    assert!(matches!(err, BumpError::Patch(PatchError::Extract { .. })));
  }

  #[test]
  fn test_no_patch_dir_means_no_patches() {
    let (dir, archive) = fixture();
    fs::remove_dir_all(dir.path().join("mozjs-sys/etc/patches")).unwrap();
    let git = SystemGit::open(dir.path()).unwrap();
    let ws = Workspace::new(git.work_tree().to_path_buf(), BumpConfig::default());

    SourceUpdater::new(&git, &ws).apply(&archive).unwrap();
    let header = fs::read_to_string(ws.source_dir().join("js").join("jsapi.h")).unwrap();
    assert_eq!(header, "#define A 1\n#define B 1\n");
  }
}
