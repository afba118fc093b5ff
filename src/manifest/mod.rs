//! Line-oriented Cargo.toml version editing
//!
//! Edits locate the FIRST line that begins with the key text and rewrite only
//! that line; every other byte of the file is preserved, including later lines
//! with the same prefix. After editing, the document is re-parsed with `toml_edit` to make
//! sure the result is still a valid manifest.

use crate::core::error::{BumpError, BumpResult, ManifestError, ResultExt};
use semver::Version;
use std::fs;
use std::path::{Path, PathBuf};

/// Version of the primary crate for an ESR release: `0.<esr>.<minor_patch>-0`
pub fn primary_version(esr: u64, minor_patch: u64) -> String {
  format!("0.{}.{}-0", esr, minor_patch)
}

/// A manifest held as lines (each with its original terminator)
#[derive(Debug, Clone)]
pub struct Manifest {
  path: PathBuf,
  lines: Vec<String>,
}

impl Manifest {
  /// Read a manifest from disk
  pub fn read(path: &Path) -> BumpResult<Self> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Self::parse(path, &content))
  }

  /// Build from text; `path` is only used in messages and by `write`
  pub fn parse(path: &Path, content: &str) -> Self {
    Self {
      path: path.to_path_buf(),
      lines: content.split_inclusive('\n').map(str::to_string).collect(),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Current text
  pub fn contents(&self) -> String {
    self.lines.concat()
  }

  /// Index of the first line beginning with `key`
  fn first_line(&self, key: &str) -> BumpResult<usize> {
    self
      .lines
      .iter()
      .position(|line| line.starts_with(key))
      .ok_or_else(|| {
        BumpError::Manifest(ManifestError::MissingLine {
          path: self.path.clone(),
          prefix: key.to_string(),
        })
      })
  }

  fn replace_line(&mut self, index: usize, text: String) {
    let terminator = line_terminator(&self.lines[index]);
    self.lines[index] = format!("{}{}", text, terminator);
  }

  /// Rewrite the first `version` line to `version = "<version>"`
  pub fn set_version(&mut self, version: &str) -> BumpResult<()> {
    let index = self.first_line("version")?;
    self.replace_line(index, format!("version = \"{}\"", version));
    Ok(())
  }

  /// Parse the first `version` line as a plain `major.minor.patch`
  pub fn current_version(&self) -> BumpResult<Version> {
    let index = self.first_line("version")?;
    let line = &self.lines[index];
    let invalid = |reason: String| {
      BumpError::Manifest(ManifestError::InvalidVersion {
        path: self.path.clone(),
        line: line.clone(),
        reason,
      })
    };

    let raw = quoted_value(line).ok_or_else(|| invalid("expected version = \"X.Y.Z\"".to_string()))?;
    let version = Version::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !version.pre.is_empty() || !version.build.is_empty() {
      return Err(invalid(format!("'{}' carries a pre-release or build suffix", raw)));
    }
    Ok(version)
  }

  /// Current version and the one with its patch component incremented
  pub fn next_patch(&self) -> BumpResult<(Version, Version)> {
    let current = self.current_version()?;
    let patch = current.patch.checked_add(1).ok_or_else(|| {
      BumpError::Manifest(ManifestError::InvalidVersion {
        path: self.path.clone(),
        line: format!("version = \"{}\"", current),
        reason: "patch component cannot be incremented".to_string(),
      })
    })?;
    let next = Version::new(current.major, current.minor, patch);
    Ok((current, next))
  }

  /// Increment the patch component of the first `version` line
  ///
  /// Returns `(old, new)`.
  pub fn bump_patch(&mut self) -> BumpResult<(Version, Version)> {
    let (current, next) = self.next_patch()?;
    let index = self.first_line("version")?;
    self.replace_line(index, format!("version = \"{}\"", next));
    Ok((current, next))
  }

  /// Pin the first `<name>` dependency line to an exact version plus path
  pub fn pin_dependency(&mut self, name: &str, version: &str, path: &str) -> BumpResult<()> {
    let index = self.first_line(name)?;
    self.replace_line(
      index,
      format!("{} = {{ version = \"={}\", path = \"{}\" }}", name, version, path),
    );
    Ok(())
  }

  /// Check the edited text is still valid TOML
  ///
  /// Warns when the `[package]` version differs from `expected`, which means
  /// the first `version` line belonged to some other table.
  pub fn validate(&self, expected: &str) -> BumpResult<()> {
    let doc: toml_edit::DocumentMut = self.contents().parse().map_err(|e: toml_edit::TomlError| {
      BumpError::Manifest(ManifestError::Corrupted {
        path: self.path.clone(),
        reason: e.to_string(),
      })
    })?;

    let package_version = doc
      .get("package")
      .and_then(|p| p.get("version"))
      .and_then(|v| v.as_str());
    if package_version != Some(expected) {
      tracing::warn!(
        manifest = %self.path.display(),
        expected,
        found = ?package_version,
        "first `version` line is not the [package] version"
      );
    }
    Ok(())
  }

  /// Write the current text back to `path`
  pub fn write(&self) -> BumpResult<()> {
    fs::write(&self.path, self.contents()).with_context(|| format!("Failed to write {}", self.path.display()))?;
    Ok(())
  }
}

fn line_terminator(line: &str) -> &'static str {
  if line.ends_with("\r\n") {
    "\r\n"
  } else if line.ends_with('\n') {
    "\n"
  } else {
    ""
  }
}

/// The first double-quoted string after `=`
fn quoted_value(line: &str) -> Option<&str> {
  let (_, value) = line.split_once('=')?;
  let value = value.trim_start().strip_prefix('"')?;
  let end = value.find('"')?;
  Some(&value[..end])
}
