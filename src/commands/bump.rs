//! `sm-bump bump` - the full security-bump pipeline

use crate::artifacts::{Downloader, RemoteArtifacts};
use crate::core::bump::{self, BumpOutcome, BumpPlan, Stages};
use crate::core::context::Workspace;
use crate::core::error::BumpResult;
use crate::core::vcs::SystemGit;
use crate::manifest::Manifest;
use crate::patch::SourceUpdater;
use crate::release::{GhCli, HgUpstream};
use std::io::IsTerminal;

/// Run the bump command
pub fn run_bump(ws: &Workspace, git: &SystemGit, dry_run: bool) -> BumpResult<()> {
  let config = &ws.config;
  let http = Downloader::new(std::io::stdout().is_terminal())?;

  let upstream = HgUpstream::new(config.upstream.clone(), http.clone());
  let host = GhCli::new(config.release.repo.clone(), ws.root.clone());
  let store = RemoteArtifacts::new(
    config.taskcluster.clone(),
    config.release.clone(),
    config.upstream.repo_name(),
    http,
  );
  let patcher = SourceUpdater::new(git, ws);

  let stages = Stages {
    upstream: &upstream,
    host: &host,
    store: &store,
    vcs: git,
    patcher: &patcher,
  };

  match bump::run(ws, &stages, dry_run)? {
    BumpOutcome::AlreadyReleased { .. } => {}
    BumpOutcome::Planned(plan) => print_plan(ws, &plan)?,
    BumpOutcome::Bumped(summary) => {
      if let Ok(head) = git.head_commit() {
        tracing::debug!(head = %head, "bump committed");
      }
      println!();
      println!("✅ Bumped to SpiderMonkey {}", summary.plan.upstream.tag);
      println!(
        "   mozjs_sys {}, mozjs {} -> {}",
        summary.plan.primary_version, summary.dependent_old_version, summary.dependent_new_version
      );
    }
  }
  Ok(())
}

/// Dry-run report
fn print_plan(ws: &Workspace, plan: &BumpPlan) -> BumpResult<()> {
  let dependent = Manifest::read(&ws.dependent_manifest())?;
  let (current, next) = dependent.next_patch()?;

  println!();
  println!("📋 Plan (dry run, nothing changed)");
  println!("   Release:          {}", plan.release_name);
  println!("   Tracking file:    {} -> {}", ws.config.paths.tracking_file.display(), plan.upstream.changeset);
  println!(
    "   Primary version:  {} ({})",
    plan.primary_version,
    ws.config.paths.primary_manifest.display()
  );
  println!(
    "   Dependent:        {} -> {} ({})",
    current,
    next,
    ws.config.paths.dependent_manifest.display()
  );
  println!("   Commits:");
  for message in [
    bump::TRACKING_COMMIT_MESSAGE,
    bump::PATCH_COMMIT_MESSAGE,
    bump::VERSION_COMMIT_MESSAGE,
  ] {
    println!("     - {}", message);
  }
  Ok(())
}
