//! `sm-bump latest` - version discovery only

use crate::artifacts::Downloader;
use crate::core::config::BumpConfig;
use crate::core::error::BumpResult;
use crate::manifest;
use crate::release::{HgUpstream, UpstreamSource};

/// Print the latest upstream release
pub fn run_latest(config: &BumpConfig, json: bool) -> BumpResult<()> {
  let http = Downloader::new(false)?;
  let upstream = HgUpstream::new(config.upstream.clone(), http);
  let latest = upstream.latest_release()?;

  if json {
    println!("{}", serde_json::to_string_pretty(&latest)?);
    return Ok(());
  }

  println!("🔍 Latest tag: {}, changeset: {}", latest.tag, latest.changeset);
  println!("   Release:  {}", config.release.release_name(&latest.changeset));
  println!(
    "   Version:  {}",
    manifest::primary_version(config.upstream.esr, latest.minor_patch)
  );
  Ok(())
}
