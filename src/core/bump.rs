//! The security-bump pipeline
//!
//! ```text
//! discover ──> release exists? ──yes──> done (no side effects)
//!                   │ no
//!                   v
//!   stage build artifacts ──> create release ──> cleanup
//!                   v
//!   write tracking file ──> commit "Update COMMIT"
//!                   v
//!   fetch source ──> apply patches ──> cleanup ──> commit "Apply patches"
//!                   v
//!   bump manifests ──> commit "Bump crate versions"
//! ```
//!
//! Every stage is fatal on failure and nothing is rolled back: commits made
//! by earlier stages stay in place.

use crate::artifacts::{ArtifactStore, StagedArtifacts};
use crate::core::context::Workspace;
use crate::core::error::{BumpResult, ResultExt};
use crate::core::vcs::VersionControl;
use crate::manifest::{self, Manifest};
use crate::patch::PatchApplier;
use crate::release::{NewRelease, ReleaseHost, UpstreamRelease, UpstreamSource};
use serde::Serialize;
use std::fs;

pub const TRACKING_COMMIT_MESSAGE: &str = "Update COMMIT";
pub const PATCH_COMMIT_MESSAGE: &str = "Apply patches";
pub const VERSION_COMMIT_MESSAGE: &str = "Bump crate versions";

/// External collaborators of one bump run
pub struct Stages<'a> {
  pub upstream: &'a dyn UpstreamSource,
  pub host: &'a dyn ReleaseHost,
  pub store: &'a dyn ArtifactStore,
  pub vcs: &'a dyn VersionControl,
  pub patcher: &'a dyn PatchApplier,
}

/// What a run would do (or did) for one upstream release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BumpPlan {
  pub upstream: UpstreamRelease,
  pub release_name: String,
  pub primary_version: String,
}

/// Versions written by a completed bump
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BumpSummary {
  pub plan: BumpPlan,
  pub dependent_old_version: String,
  pub dependent_new_version: String,
}

/// Result of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BumpOutcome {
  /// The release already exists; nothing was touched
  AlreadyReleased { release_name: String },
  /// Dry run stopped after the existence check
  Planned(BumpPlan),
  /// All three commits were made
  Bumped(BumpSummary),
}

/// Run the pipeline
pub fn run(ws: &Workspace, stages: &Stages<'_>, dry_run: bool) -> BumpResult<BumpOutcome> {
  let upstream = stages.upstream.latest_release()?;
  println!("🔍 Latest tag: {}, changeset: {}", upstream.tag, upstream.changeset);

  let release_name = ws.config.release.release_name(&upstream.changeset);
  if stages.host.release_exists(&release_name)? {
    println!("✅ Release {} already exists, skipping SM bumps", release_name);
    return Ok(BumpOutcome::AlreadyReleased { release_name });
  }

  let plan = BumpPlan {
    primary_version: manifest::primary_version(ws.config.upstream.esr, upstream.minor_patch),
    release_name,
    upstream,
  };

  if dry_run {
    return Ok(BumpOutcome::Planned(plan));
  }

  publish_source_release(ws, stages, &plan)?;
  update_tracking_file(ws, stages, &plan.upstream.changeset)?;
  apply_source_patches(ws, stages, &plan.release_name)?;
  let (old, new) = bump_manifest_versions(ws, stages, &plan.primary_version)?;

  Ok(BumpOutcome::Bumped(BumpSummary {
    plan,
    dependent_old_version: old,
    dependent_new_version: new,
  }))
}

/// Stage the build artifacts and republish them as a release
fn publish_source_release(ws: &Workspace, stages: &Stages<'_>, plan: &BumpPlan) -> BumpResult<()> {
  println!("📦 Staging artifacts for {}", plan.upstream.changeset);
  let mut staging = StagedArtifacts::new(ws.staging_dir());
  stages
    .store
    .stage_build_artifacts(&plan.upstream.changeset, &mut staging)?;

  let revision_url = ws.config.upstream.revision_url(&plan.upstream.changeset);
  let release = NewRelease::source_snapshot(
    plan.release_name.clone(),
    &plan.upstream.tag,
    &plan.upstream.changeset,
    &revision_url,
    staging.files().to_vec(),
  );
  stages.host.create_release(&release)?;
  println!("   ✅ Created release {}", release.name);

  staging.cleanup();
  Ok(())
}

/// Record the changeset and commit it
fn update_tracking_file(ws: &Workspace, stages: &Stages<'_>, changeset: &str) -> BumpResult<()> {
  let tracking = ws.tracking_file();
  if let Some(parent) = tracking.parent() {
    fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
  }
  fs::write(&tracking, changeset).with_context(|| format!("Failed to write {}", tracking.display()))?;
  stages.vcs.add(&[tracking.as_path()])?;
  stages.vcs.commit(TRACKING_COMMIT_MESSAGE)?;
  Ok(())
}

/// Re-vendor the source from the published release and commit the result
fn apply_source_patches(ws: &Workspace, stages: &Stages<'_>, release_name: &str) -> BumpResult<()> {
  println!("🩹 Updating vendored source");
  let mut staging = StagedArtifacts::new(ws.staging_dir());
  let archive = stages
    .store
    .fetch_release_asset(release_name, &ws.config.release.source_artifact, &mut staging)?;
  stages.patcher.apply(&archive)?;
  staging.cleanup();

  stages.vcs.add_all()?;
  stages.vcs.commit(PATCH_COMMIT_MESSAGE)?;
  Ok(())
}

/// Rewrite both manifests and commit them together
///
/// Returns the dependent crate's `(old, new)` versions.
fn bump_manifest_versions(ws: &Workspace, stages: &Stages<'_>, version: &str) -> BumpResult<(String, String)> {
  println!("🔢 Updating to version {}", version);

  let mut primary = Manifest::read(&ws.primary_manifest())?;
  primary.set_version(version)?;
  primary.validate(version)?;

  let mut dependent = Manifest::read(&ws.dependent_manifest())?;
  let (old, new) = dependent.bump_patch()?;
  println!("   Current version: {}", old);
  let dependency = &ws.config.dependency;
  dependent.pin_dependency(&dependency.name, version, &dependency.path)?;
  dependent.validate(&new.to_string())?;

  primary.write()?;
  dependent.write()?;
  println!("   Updated {} and {}", primary.path().display(), dependent.path().display());

  stages.vcs.add_all()?;
  stages.vcs.commit(VERSION_COMMIT_MESSAGE)?;
  Ok((old.to_string(), new.to_string()))
}
