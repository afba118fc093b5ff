//! Config discovery and validation through the binary

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_invalid_config_exits_with_user_code() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_file("sm-bump.toml", "[upstream]\nesr = 0\n")?;

  let output = sm_bump(&workspace.path, &["bump", "--dry-run"])?;

  assert_eq!(output.status.code(), Some(1));
  let err = stderr(&output);
  assert!(err.contains("upstream.esr"));
  assert!(err.contains("💡 Help"));
  Ok(())
}

#[test]
fn test_unknown_config_key_is_rejected() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_file("sm-bump.toml", "[release]\nrepository = \"servo/mozjs\"\n")?;

  let output = sm_bump(&workspace.path, &["bump", "--dry-run"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("repository"));
  Ok(())
}

#[test]
fn test_missing_explicit_config_is_error() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = sm_bump(&workspace.path, &["--config", "nope.toml", "bump", "--dry-run"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Config file not found"));
  Ok(())
}

#[test]
fn test_config_in_mozjs_sys_etc_redirects_paths() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write_file(
    "mozjs-sys/etc/sm-bump.toml",
    "[paths]\nsource_dir = \"vendor/spidermonkey\"\npatches_dir = \"vendor/patches\"\n",
  )?;
  workspace.write_file(
    "vendor/patches/0001-edit.patch",
    "--- a/js/jsapi.h\n+++ b/js/jsapi.h\n@@ -1 +1 @@\n-#define VERSION 128\n+#define VERSION 999\n",
  )?;
  let archive = workspace.build_archive(&[("js/jsapi.h", "#define VERSION 128\n")])?;

  run_sm_bump(&workspace.path, &["apply-patches", archive.to_str().unwrap()])?;

  assert_eq!(workspace.read_file("vendor/spidermonkey/js/jsapi.h")?, "#define VERSION 999\n");
  // Default vendored tree is not touched
  assert!(workspace.file_exists("mozjs-sys/mozjs/js/removed.h"));
  Ok(())
}
