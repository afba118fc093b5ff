//! `sm-bump apply-patches` - re-vendor from a local archive without committing

use crate::core::context::Workspace;
use crate::core::error::{BumpError, BumpResult};
use crate::core::vcs::SystemGit;
use crate::patch::{PatchApplier, SourceUpdater};
use std::path::Path;

pub fn run_apply_patches(ws: &Workspace, git: &SystemGit, archive: &Path) -> BumpResult<()> {
  if !archive.is_file() {
    return Err(BumpError::with_help(
      format!("Archive not found: {}", archive.display()),
      "Pass the path to a downloaded mozjs.tar.xz",
    ));
  }
  let archive = archive.canonicalize()?;

  println!("🩹 Updating {} from {}", ws.config.paths.source_dir.display(), archive.display());
  SourceUpdater::new(git, ws).apply(&archive)?;
  println!("✅ Source updated; review and commit the result");
  Ok(())
}
