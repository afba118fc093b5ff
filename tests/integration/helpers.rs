//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const PRIMARY_MANIFEST: &str = r#"[package]
name = "mozjs_sys"
version = "0.128.3-1"
edition = "2021"
"#;

pub const DEPENDENT_MANIFEST: &str = r#"[package]
name = "mozjs"
version = "0.14.1"
edition = "2021"

[dependencies]
mozjs_sys = { version = "=0.128.3-1", path = "../mozjs-sys" }
"#;

/// A mozjs-style repository with one commit
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Create the `mozjs-sys` + `mozjs` layout with a vendored tree
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    let ws = Self { _root: root, path };
    ws.write_file("mozjs-sys/Cargo.toml", PRIMARY_MANIFEST)?;
    ws.write_file("mozjs/Cargo.toml", DEPENDENT_MANIFEST)?;
    ws.write_file("mozjs-sys/etc/COMMIT", "0123456789ab")?;
    ws.write_file("mozjs-sys/mozjs/js/jsapi.h", "#define VERSION 127\n")?;
    ws.write_file("mozjs-sys/mozjs/js/removed.h", "gone upstream\n")?;

    git(&ws.path, &["add", "."])?;
    git(&ws.path, &["commit", "-m", "Initial layout"])?;

    Ok(ws)
  }

  /// Write a file relative to the repository root, creating directories
  pub fn write_file(&self, rel: &str, content: &str) -> Result<()> {
    let file = self.path.join(rel);
    if let Some(parent) = file.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file, content)?;
    Ok(())
  }

  /// Add a patch under `mozjs-sys/etc/patches`
  pub fn add_patch(&self, name: &str, content: &str) -> Result<()> {
    self.write_file(&format!("mozjs-sys/etc/patches/{}", name), content)
  }

  /// Build `mozjs.tar.gz` with `files` under a single top-level directory
  pub fn build_archive(&self, files: &[(&str, &str)]) -> Result<PathBuf> {
    let staging = self.path.join("archive-src");
    for (rel, content) in files {
      let file = staging.join("mozjs-128.5.0").join(rel);
      if let Some(parent) = file.parent() {
        std::fs::create_dir_all(parent)?;
      }
      std::fs::write(file, content)?;
    }

    let archive = self.path.join("mozjs.tar.gz");
    let output = Command::new("tar")
      .current_dir(&staging)
      .arg("-czf")
      .arg(&archive)
      .arg("mozjs-128.5.0")
      .output()
      .context("Failed to run tar")?;
    if !output.status.success() {
      anyhow::bail!("tar failed: {}", String::from_utf8_lossy(&output.stderr));
    }
    std::fs::remove_dir_all(&staging)?;
    Ok(archive)
  }

  /// Number of commits on HEAD
  pub fn commit_count(&self) -> Result<usize> {
    let output = git(&self.path, &["rev-list", "--count", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().parse()?)
  }

  /// Check if a file exists
  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  /// Read a file
  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run sm-bump and return its output whatever the exit status
pub fn sm_bump(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_sm-bump");
  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run sm-bump")
}

/// Run sm-bump and fail unless it succeeds
pub fn run_sm_bump(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = sm_bump(cwd, args)?;
  if !output.status.success() {
    anyhow::bail!(
      "sm-bump command failed: sm-bump {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      String::from_utf8_lossy(&output.stdout),
      String::from_utf8_lossy(&output.stderr)
    );
  }
  Ok(output)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).to_string()
}
