//! Staging, committing and patch application for SystemGit

use super::VersionControl;
use super::system_git::SystemGit;
use crate::core::error::BumpResult;
use crate::utils::path_to_git_format;
use std::path::Path;

impl SystemGit {
  /// Apply a patch file with paths rooted at `directory`
  ///
  /// `directory` is relative to the working tree root.
  pub fn apply_patch(&self, patch: &Path, directory: &Path) -> BumpResult<()> {
    let directory_arg = format!("--directory={}", path_to_git_format(directory));
    let patch_arg = path_to_git_format(patch);
    let shown = format!("git apply {} {}", directory_arg, patch_arg);
    self.run(&["apply", "--whitespace=nowarn", &directory_arg, &patch_arg], &shown)?;
    Ok(())
  }
}

impl VersionControl for SystemGit {
  fn add(&self, paths: &[&Path]) -> BumpResult<()> {
    let formatted: Vec<String> = paths.iter().map(|p| path_to_git_format(p)).collect();
    let mut args = vec!["add", "--"];
    args.extend(formatted.iter().map(String::as_str));
    let shown = format!("git add {}", formatted.join(" "));
    self.run(&args, &shown)?;
    Ok(())
  }

  fn add_all(&self) -> BumpResult<()> {
    self.run(&["add", "--all"], "git add --all")?;
    Ok(())
  }

  fn commit(&self, message: &str) -> BumpResult<()> {
    let shown = format!("git commit -m \"{}\" --signoff", message);
    self.run(&["commit", "-m", message, "--signoff"], &shown)?;
    println!("   ✅ Committed: {}", message);
    Ok(())
  }
}
