//! Error types for sm-bump with contextual messages and exit codes
//!
//! Every failure in the bump pipeline is fatal. The error carries enough
//! context to tell which stage failed and, where possible, a hint on how to
//! recover from the partially committed state.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for sm-bump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, manifests, invalid args)
  User = 1,
  /// System error (git, gh, network, I/O)
  System = 2,
  /// Patch application failed
  Patch = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for sm-bump
#[derive(Debug)]
pub enum BumpError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Release host (gh) errors
  Release(ReleaseError),

  /// HTTP download errors
  Download(DownloadError),

  /// Manifest editing errors
  Manifest(ManifestError),

  /// Patch application errors
  Patch(PatchError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl BumpError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    BumpError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    BumpError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  ///
  /// Structured errors are folded into a message so the context is never lost.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      BumpError::Message { message, context, help } => BumpError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      BumpError::Io(e) => BumpError::Message {
        message: ctx_str,
        context: Some(format!("I/O error: {}", e)),
        help: None,
      },
      other => other,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      BumpError::Config(_) => ExitCode::User,
      BumpError::Manifest(_) => ExitCode::User,
      BumpError::Git(_) => ExitCode::System,
      BumpError::Release(_) => ExitCode::System,
      BumpError::Download(_) => ExitCode::System,
      BumpError::Io(_) => ExitCode::System,
      BumpError::Patch(_) => ExitCode::Patch,
      BumpError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      BumpError::Config(e) => e.help_message(),
      BumpError::Git(e) => e.help_message(),
      BumpError::Release(e) => e.help_message(),
      BumpError::Download(e) => e.help_message(),
      BumpError::Manifest(e) => e.help_message(),
      BumpError::Patch(e) => e.help_message(),
      BumpError::Message { help, .. } => help.clone(),
      BumpError::Io(_) => None,
    }
  }
}

impl fmt::Display for BumpError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BumpError::Config(e) => write!(f, "{}", e),
      BumpError::Git(e) => write!(f, "{}", e),
      BumpError::Release(e) => write!(f, "{}", e),
      BumpError::Download(e) => write!(f, "{}", e),
      BumpError::Manifest(e) => write!(f, "{}", e),
      BumpError::Patch(e) => write!(f, "{}", e),
      BumpError::Io(e) => write!(f, "I/O error: {}", e),
      BumpError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for BumpError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      BumpError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for BumpError {
  fn from(err: io::Error) -> Self {
    BumpError::Io(err)
  }
}

impl From<String> for BumpError {
  fn from(msg: String) -> Self {
    BumpError::message(msg)
  }
}

impl From<&str> for BumpError {
  fn from(msg: &str) -> Self {
    BumpError::message(msg)
  }
}

impl From<toml_edit::de::Error> for BumpError {
  fn from(err: toml_edit::de::Error) -> Self {
    BumpError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for BumpError {
  fn from(err: serde_json::Error) -> Self {
    BumpError::message(format!("JSON error: {}", err))
  }
}

impl From<semver::Error> for BumpError {
  fn from(err: semver::Error) -> Self {
    BumpError::message(format!("Version parse error: {}", err))
  }
}

impl From<glob::PatternError> for BumpError {
  fn from(err: glob::PatternError) -> Self {
    BumpError::message(format!("Invalid glob pattern: {}", err))
  }
}

impl From<glob::GlobError> for BumpError {
  fn from(err: glob::GlobError) -> Self {
    BumpError::message(format!("Failed to read patch directory entry: {}", err))
  }
}

impl From<reqwest::Error> for BumpError {
  fn from(err: reqwest::Error) -> Self {
    let url = err.url().map(|u| u.to_string()).unwrap_or_default();
    BumpError::Download(DownloadError::Transport {
      url,
      reason: err.to_string(),
    })
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Explicit config path does not exist
  NotFound { path: PathBuf },

  /// A field failed validation
  Invalid { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => {
        Some("Omit --config to use sm-bump.toml from the repository root (or built-in defaults).".to_string())
      }
      ConfigError::Invalid { .. } => Some("Fix the value in sm-bump.toml or remove it to use the default.".to_string()),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => {
        write!(f, "Config file not found: {}", path.display())
      }
      ConfigError::Invalid { field, reason } => {
        write!(f, "Invalid config value for '{}': {}", field, reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::CommandFailed { command, stderr } => {
        if command.contains("commit") && stderr.contains("user.email") {
          Some("Configure a committer identity: git config user.name/user.email".to_string())
        } else if command.contains("apply") {
          Some("A patch no longer applies cleanly; refresh it against the new upstream source.".to_string())
        } else {
          Some("Earlier steps may already be committed. Inspect `git log` before re-running.".to_string())
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Run sm-bump from inside the mozjs checkout (looked at {})",
        path.display()
      )),
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
    }
  }
}

/// Release host (gh CLI) errors
#[derive(Debug)]
pub enum ReleaseError {
  /// gh could not be spawned at all
  ToolMissing { tool: String, reason: String },

  /// Existence check failed for a reason other than "not found"
  QueryFailed { release: String, stderr: String },

  /// Release creation failed
  CreateFailed { release: String, stderr: String },
}

impl ReleaseError {
  fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::ToolMissing { .. } => Some("Install the GitHub CLI: https://cli.github.com".to_string()),
      ReleaseError::QueryFailed { stderr, .. } | ReleaseError::CreateFailed { stderr, .. } => {
        if stderr.contains("auth") || stderr.contains("401") || stderr.contains("403") {
          Some("Authenticate first: gh auth login (or set GH_TOKEN)".to_string())
        } else {
          None
        }
      }
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::ToolMissing { tool, reason } => {
        write!(f, "Failed to run {}: {}", tool, reason)
      }
      ReleaseError::QueryFailed { release, stderr } => {
        write!(f, "Failed to query release {}:\n{}", release, stderr)
      }
      ReleaseError::CreateFailed { release, stderr } => {
        write!(f, "Failed to create release {}:\n{}", release, stderr)
      }
    }
  }
}

/// HTTP download errors
#[derive(Debug)]
pub enum DownloadError {
  /// Server answered with a non-success status
  Status { url: String, status: u16 },

  /// Connection, TLS or body read failure
  Transport { url: String, reason: String },

  /// Upstream response did not contain what we need
  Parse { url: String, reason: String },
}

impl DownloadError {
  fn help_message(&self) -> Option<String> {
    match self {
      DownloadError::Status { status: 404, .. } => {
        Some("The artifact is not published yet. Wait for the upstream build to finish and re-run.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for DownloadError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DownloadError::Status { url, status } => {
        write!(f, "Download failed with HTTP {}: {}", status, url)
      }
      DownloadError::Transport { url, reason } => {
        write!(f, "Download failed: {}\n{}", url, reason)
      }
      DownloadError::Parse { url, reason } => {
        write!(f, "Unexpected response from {}: {}", url, reason)
      }
    }
  }
}

/// Manifest editing errors
#[derive(Debug)]
pub enum ManifestError {
  /// No line starts with the expected prefix
  MissingLine { path: PathBuf, prefix: String },

  /// The version field could not be parsed
  InvalidVersion { path: PathBuf, line: String, reason: String },

  /// The rewritten manifest is no longer valid TOML
  Corrupted { path: PathBuf, reason: String },
}

impl ManifestError {
  fn help_message(&self) -> Option<String> {
    match self {
      ManifestError::MissingLine { .. } => {
        Some("Check [paths] and [dependency] in sm-bump.toml point at the right manifests.".to_string())
      }
      ManifestError::InvalidVersion { .. } => {
        Some("The dependent crate version must be a plain major.minor.patch triple.".to_string())
      }
      ManifestError::Corrupted { .. } => None,
    }
  }
}

impl fmt::Display for ManifestError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ManifestError::MissingLine { path, prefix } => {
        write!(f, "No line starting with '{}' in {}", prefix, path.display())
      }
      ManifestError::InvalidVersion { path, line, reason } => {
        write!(f, "Invalid version line in {}: {}\n{}", path.display(), line.trim_end(), reason)
      }
      ManifestError::Corrupted { path, reason } => {
        write!(f, "Rewriting {} produced invalid TOML: {}", path.display(), reason)
      }
    }
  }
}

/// Patch application errors
#[derive(Debug)]
pub enum PatchError {
  /// Archive extraction failed
  Extract { archive: PathBuf, stderr: String },

  /// A patch did not apply
  Apply { patch: PathBuf, stderr: String },
}

impl PatchError {
  fn help_message(&self) -> Option<String> {
    match self {
      PatchError::Extract { .. } => Some("Check the archive is a complete tarball and `tar` is on PATH.".to_string()),
      PatchError::Apply { patch, .. } => Some(format!(
        "Refresh {} against the new upstream source, then re-run with `sm-bump apply-patches`.",
        patch.display()
      )),
    }
  }
}

impl fmt::Display for PatchError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PatchError::Extract { archive, stderr } => {
        write!(f, "Failed to extract {}:\n{}", archive.display(), stderr)
      }
      PatchError::Apply { patch, stderr } => {
        write!(f, "Failed to apply patch {}:\n{}", patch.display(), stderr)
      }
    }
  }
}

/// Result type alias for sm-bump
pub type BumpResult<T> = Result<T, BumpError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> BumpResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> BumpResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<BumpError>,
{
  fn context(self, ctx: impl Into<String>) -> BumpResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> BumpResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &BumpError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
