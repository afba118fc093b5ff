//! Tests for the `apply-patches` command

use crate::helpers::*;
use anyhow::Result;

const BUMP_VERSION: &str = "--- a/js/jsapi.h\n+++ b/js/jsapi.h\n@@ -1,2 +1,2 @@\n-#define VERSION 128\n+#define VERSION 128001\n #define SERVO 0\n";
const ENABLE_SERVO: &str = "--- a/js/jsapi.h\n+++ b/js/jsapi.h\n@@ -1,2 +1,2 @@\n #define VERSION 128001\n-#define SERVO 0\n+#define SERVO 1\n";

#[test]
fn test_apply_patches_replaces_vendored_tree() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let archive = workspace.build_archive(&[("js/jsapi.h", "#define VERSION 128\n#define SERVO 0\n"), ("js/new.h", "new\n")])?;
  workspace.add_patch("0001-version.patch", BUMP_VERSION)?;
  workspace.add_patch("0002-servo.patch", ENABLE_SERVO)?;
  let before = workspace.commit_count()?;

  let output = run_sm_bump(&workspace.path, &["apply-patches", archive.to_str().unwrap()])?;

  assert!(stdout(&output).contains("Applying 2 patch(es)"));
  assert_eq!(
    workspace.read_file("mozjs-sys/mozjs/js/jsapi.h")?,
    "#define VERSION 128001\n#define SERVO 1\n"
  );
  assert!(workspace.file_exists("mozjs-sys/mozjs/js/new.h"));
  assert!(!workspace.file_exists("mozjs-sys/mozjs/js/removed.h"));

  // Standalone mode never commits
  assert_eq!(workspace.commit_count()?, before);
  // The archive is the caller's; it is left in place
  assert!(archive.exists());

  Ok(())
}

#[test]
fn test_apply_patches_accepts_relative_archive_path() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.build_archive(&[("js/jsapi.h", "#define VERSION 128\n")])?;

  run_sm_bump(&workspace.path.join("mozjs"), &["apply-patches", "../mozjs.tar.gz"])?;

  assert_eq!(workspace.read_file("mozjs-sys/mozjs/js/jsapi.h")?, "#define VERSION 128\n");
  Ok(())
}

#[test]
fn test_patches_apply_in_file_name_order() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let archive = workspace.build_archive(&[("js/jsapi.h", "#define VERSION 128\n#define SERVO 0\n")])?;
  // Written out of order; 0002 only applies on top of 0001
  workspace.add_patch("0002-servo.patch", ENABLE_SERVO)?;
  workspace.add_patch("0001-version.patch", BUMP_VERSION)?;

  run_sm_bump(&workspace.path, &["apply-patches", archive.to_str().unwrap()])?;

  assert_eq!(
    workspace.read_file("mozjs-sys/mozjs/js/jsapi.h")?,
    "#define VERSION 128001\n#define SERVO 1\n"
  );
  Ok(())
}

#[test]
fn test_failing_patch_exits_with_patch_code() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let archive = workspace.build_archive(&[("js/jsapi.h", "#define VERSION 129\n#define SERVO 0\n")])?;
  workspace.add_patch("0001-version.patch", BUMP_VERSION)?;

  let output = sm_bump(&workspace.path, &["apply-patches", archive.to_str().unwrap()])?;

  assert_eq!(output.status.code(), Some(3));
  let err = stderr(&output);
  assert!(err.contains("❌"));
  assert!(err.contains("0001-version.patch"));
  Ok(())
}

#[test]
fn test_missing_archive_is_user_error() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = sm_bump(&workspace.path, &["apply-patches", "does-not-exist.tar.xz"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Archive not found"));
  // Vendored tree untouched
  assert!(workspace.file_exists("mozjs-sys/mozjs/js/removed.h"));
  Ok(())
}
