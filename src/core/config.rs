use crate::core::error::{BumpError, BumpResult, ConfigError, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Configuration for sm-bump
/// Searched in order: sm-bump.toml, .sm-bump.toml, mozjs-sys/etc/sm-bump.toml
///
/// Every section is optional; the defaults describe the servo/mozjs layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BumpConfig {
  #[serde(default)]
  pub upstream: UpstreamConfig,
  #[serde(default)]
  pub release: ReleaseConfig,
  #[serde(default)]
  pub taskcluster: TaskclusterConfig,
  #[serde(default)]
  pub paths: PathsConfig,
  #[serde(default)]
  pub dependency: DependencyConfig,
}

/// Upstream Mercurial repository the ESR tags are read from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
  /// ESR release line (e.g. 128)
  #[serde(default = "default_esr")]
  pub esr: u64,

  /// Repository name under `releases/` (default: "mozilla-esr{esr}")
  #[serde(default)]
  pub repo: Option<String>,

  #[serde(default = "default_hg_base_url")]
  pub hg_base_url: String,
}

fn default_esr() -> u64 {
  128
}

fn default_hg_base_url() -> String {
  "https://hg.mozilla.org".to_string()
}

impl Default for UpstreamConfig {
  fn default() -> Self {
    Self {
      esr: default_esr(),
      repo: None,
      hg_base_url: default_hg_base_url(),
    }
  }
}

impl UpstreamConfig {
  /// Effective upstream repository name
  pub fn repo_name(&self) -> String {
    self.repo.clone().unwrap_or_else(|| format!("mozilla-esr{}", self.esr))
  }

  /// Base URL with any trailing slash removed
  pub fn base_url(&self) -> &str {
    self.hg_base_url.trim_end_matches('/')
  }

  /// URL of the `json-tags` listing
  pub fn tags_url(&self) -> String {
    format!("{}/releases/{}/json-tags", self.base_url(), self.repo_name())
  }

  /// URL of a single upstream revision (used in release notes)
  pub fn revision_url(&self, changeset: &str) -> String {
    format!("{}/releases/{}/rev/{}", self.base_url(), self.repo_name(), changeset)
  }
}

/// GitHub release the source snapshot is republished to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReleaseConfig {
  /// `owner/name` of the hosting repository
  #[serde(default = "default_release_repo")]
  pub repo: String,

  #[serde(default = "default_name_prefix")]
  pub name_prefix: String,

  /// Asset re-downloaded from the published release for patching
  #[serde(default = "default_source_artifact")]
  pub source_artifact: String,

  #[serde(default = "default_github_url")]
  pub github_url: String,
}

fn default_release_repo() -> String {
  "servo/mozjs".to_string()
}

fn default_name_prefix() -> String {
  "mozjs-source-".to_string()
}

fn default_source_artifact() -> String {
  "mozjs.tar.xz".to_string()
}

fn default_github_url() -> String {
  "https://github.com".to_string()
}

impl Default for ReleaseConfig {
  fn default() -> Self {
    Self {
      repo: default_release_repo(),
      name_prefix: default_name_prefix(),
      source_artifact: default_source_artifact(),
      github_url: default_github_url(),
    }
  }
}

impl ReleaseConfig {
  /// Release name for a changeset (the idempotency key)
  pub fn release_name(&self, changeset: &str) -> String {
    format!("{}{}", self.name_prefix, changeset)
  }

  /// Download URL of an asset attached to a release
  pub fn asset_url(&self, release: &str, asset: &str) -> String {
    format!(
      "{}/{}/releases/download/{}/{}",
      self.github_url.trim_end_matches('/'),
      self.repo,
      release,
      asset
    )
  }
}

/// Taskcluster index lookup for the build artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskclusterConfig {
  #[serde(default = "default_tc_root_url")]
  pub root_url: String,

  #[serde(default = "default_tc_artifacts")]
  pub artifacts: Vec<ArtifactConfig>,
}

/// One file fetched from a Taskcluster indexed task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactConfig {
  /// Local file name (also the release asset name)
  pub name: String,
  /// Index namespace; `{repo}` and `{changeset}` are substituted
  pub namespace: String,
  /// Artifact path inside the task
  pub path: String,
}

fn default_tc_root_url() -> String {
  "https://firefox-ci-tc.services.mozilla.com".to_string()
}

fn default_tc_artifacts() -> Vec<ArtifactConfig> {
  let hazard = "gecko.v2.{repo}.revision.{changeset}.firefox.linux64-haz-debug";
  vec![
    ArtifactConfig {
      name: "mozjs.tar.xz".to_string(),
      namespace: "gecko.v2.{repo}.revision.{changeset}.firefox.sm-package-linux64-opt".to_string(),
      path: "public/build/mozjs.tar.xz".to_string(),
    },
    ArtifactConfig {
      name: "allFunctions.txt.gz".to_string(),
      namespace: hazard.to_string(),
      path: "public/build/allFunctions.txt.gz".to_string(),
    },
    ArtifactConfig {
      name: "gcFunctions.txt.gz".to_string(),
      namespace: hazard.to_string(),
      path: "public/build/gcFunctions.txt.gz".to_string(),
    },
  ]
}

impl Default for TaskclusterConfig {
  fn default() -> Self {
    Self {
      root_url: default_tc_root_url(),
      artifacts: default_tc_artifacts(),
    }
  }
}

impl TaskclusterConfig {
  /// Resolve the download URL of an artifact for a changeset
  pub fn artifact_url(&self, artifact: &ArtifactConfig, repo: &str, changeset: &str) -> String {
    let namespace = artifact
      .namespace
      .replace("{repo}", repo)
      .replace("{changeset}", changeset);
    format!(
      "{}/api/index/v1/task/{}/artifacts/{}",
      self.root_url.trim_end_matches('/'),
      namespace,
      artifact.path
    )
  }
}

/// Files the bump reads and writes, relative to the repository root
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
  #[serde(default = "default_tracking_file")]
  pub tracking_file: PathBuf,
  #[serde(default = "default_primary_manifest")]
  pub primary_manifest: PathBuf,
  #[serde(default = "default_dependent_manifest")]
  pub dependent_manifest: PathBuf,
  /// Vendored upstream source, replaced wholesale on every bump
  #[serde(default = "default_source_dir")]
  pub source_dir: PathBuf,
  #[serde(default = "default_patches_dir")]
  pub patches_dir: PathBuf,
  /// Leading path components dropped when extracting the source archive
  #[serde(default = "default_strip_components")]
  pub strip_components: u32,
}

fn default_tracking_file() -> PathBuf {
  PathBuf::from("mozjs-sys/etc/COMMIT")
}

fn default_primary_manifest() -> PathBuf {
  PathBuf::from("mozjs-sys/Cargo.toml")
}

fn default_dependent_manifest() -> PathBuf {
  PathBuf::from("mozjs/Cargo.toml")
}

fn default_source_dir() -> PathBuf {
  PathBuf::from("mozjs-sys/mozjs")
}

fn default_patches_dir() -> PathBuf {
  PathBuf::from("mozjs-sys/etc/patches")
}

fn default_strip_components() -> u32 {
  1
}

impl Default for PathsConfig {
  fn default() -> Self {
    Self {
      tracking_file: default_tracking_file(),
      primary_manifest: default_primary_manifest(),
      dependent_manifest: default_dependent_manifest(),
      source_dir: default_source_dir(),
      patches_dir: default_patches_dir(),
      strip_components: default_strip_components(),
    }
  }
}

/// How the dependent manifest refers to the primary crate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyConfig {
  #[serde(default = "default_dependency_name")]
  pub name: String,
  #[serde(default = "default_dependency_path")]
  pub path: String,
}

fn default_dependency_name() -> String {
  "mozjs_sys".to_string()
}

fn default_dependency_path() -> String {
  "../mozjs-sys".to_string()
}

impl Default for DependencyConfig {
  fn default() -> Self {
    Self {
      name: default_dependency_name(),
      path: default_dependency_path(),
    }
  }
}

impl BumpConfig {
  /// Find config file in search order: sm-bump.toml, .sm-bump.toml, mozjs-sys/etc/sm-bump.toml
  pub fn find_config_path(root: &Path) -> Option<PathBuf> {
    let candidates = vec![
      root.join("sm-bump.toml"),
      root.join(".sm-bump.toml"),
      root.join("mozjs-sys").join("etc").join("sm-bump.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config for a repository root
  ///
  /// An explicit path must exist. Without one, the search locations are tried
  /// and the built-in defaults are used when none exists.
  pub fn load(root: &Path, explicit: Option<&Path>) -> BumpResult<Self> {
    let config_path = match explicit {
      Some(path) => {
        if !path.exists() {
          return Err(BumpError::Config(ConfigError::NotFound {
            path: path.to_path_buf(),
          }));
        }
        Some(path.to_path_buf())
      }
      None => Self::find_config_path(root),
    };

    let Some(config_path) = config_path else {
      tracing::debug!("no config file found under {}, using defaults", root.display());
      return Ok(Self::default());
    };

    tracing::debug!("loading config from {}", config_path.display());
    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).with_context(|| format!("Invalid config in {}", config_path.display()))?;
    Ok(config)
  }

  /// Parse and validate config text
  pub fn parse(content: &str) -> BumpResult<Self> {
    let config: BumpConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Validate the configuration
  pub fn validate(&self) -> BumpResult<()> {
    if self.upstream.esr == 0 {
      return Err(invalid("upstream.esr", "must be a positive release number"));
    }

    match self.release.repo.split_once('/') {
      Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {}
      _ => {
        return Err(invalid(
          "release.repo",
          format!("'{}' is not of the form owner/name", self.release.repo),
        ));
      }
    }

    if self.release.name_prefix.is_empty() {
      return Err(invalid("release.name_prefix", "must not be empty"));
    }

    if self.taskcluster.artifacts.is_empty() {
      return Err(invalid("taskcluster.artifacts", "at least one artifact is required"));
    }

    let mut seen = HashSet::new();
    for artifact in &self.taskcluster.artifacts {
      if artifact.name.is_empty() || artifact.name.contains('/') || artifact.name.contains('\\') {
        return Err(invalid(
          "taskcluster.artifacts.name",
          format!("'{}' must be a plain file name", artifact.name),
        ));
      }
      if !seen.insert(artifact.name.as_str()) {
        return Err(invalid(
          "taskcluster.artifacts.name",
          format!("'{}' is listed twice", artifact.name),
        ));
      }
      if !artifact.namespace.contains("{changeset}") {
        return Err(invalid(
          "taskcluster.artifacts.namespace",
          format!("'{}' must contain {{changeset}}", artifact.namespace),
        ));
      }
    }

    let paths = [
      ("paths.tracking_file", &self.paths.tracking_file),
      ("paths.primary_manifest", &self.paths.primary_manifest),
      ("paths.dependent_manifest", &self.paths.dependent_manifest),
      ("paths.source_dir", &self.paths.source_dir),
      ("paths.patches_dir", &self.paths.patches_dir),
    ];
    for (field, path) in paths {
      if !is_contained_relative(path) {
        return Err(invalid(
          field,
          format!("'{}' must be relative to the repository root", path.display()),
        ));
      }
    }

    if self.dependency.name.is_empty() {
      return Err(invalid("dependency.name", "must not be empty"));
    }

    Ok(())
  }
}

fn invalid(field: &str, reason: impl Into<String>) -> BumpError {
  BumpError::Config(ConfigError::Invalid {
    field: field.to_string(),
    reason: reason.into(),
  })
}

/// Relative, non-empty, and never escaping the root via `..`
fn is_contained_relative(path: &Path) -> bool {
  !path.as_os_str().is_empty()
    && path
      .components()
      .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
