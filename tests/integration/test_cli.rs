//! Command-line surface tests

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_help_lists_commands() -> Result<()> {
  let temp = tempfile::TempDir::new()?;
  let output = run_sm_bump(temp.path(), &["--help"])?;
  let text = stdout(&output);

  assert!(text.contains("bump"));
  assert!(text.contains("latest"));
  assert!(text.contains("apply-patches"));
  assert!(text.contains("--config"));
  assert!(text.contains("--verbose"));
  Ok(())
}

#[test]
fn test_bump_help_shows_dry_run() -> Result<()> {
  let temp = tempfile::TempDir::new()?;
  let output = run_sm_bump(temp.path(), &["bump", "--help"])?;
  assert!(stdout(&output).contains("--dry-run"));
  Ok(())
}

#[test]
fn test_version_flag() -> Result<()> {
  let temp = tempfile::TempDir::new()?;
  let output = run_sm_bump(temp.path(), &["--version"])?;
  assert!(stdout(&output).starts_with("sm-bump "));
  Ok(())
}

#[test]
fn test_unknown_subcommand_is_rejected() -> Result<()> {
  let temp = tempfile::TempDir::new()?;
  let output = sm_bump(temp.path(), &["publish"])?;
  assert!(!output.status.success());
  Ok(())
}

#[test]
fn test_outside_repository_is_system_error() -> Result<()> {
  let temp = tempfile::TempDir::new()?;
  let output = sm_bump(temp.path(), &["apply-patches", "mozjs.tar.xz"])?;

  assert_eq!(output.status.code(), Some(2));
  assert!(stderr(&output).contains("❌"));
  Ok(())
}
