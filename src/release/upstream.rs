//! Latest ESR release discovery from the upstream Mercurial repository
//!
//! Release tags look like `FIREFOX_128_5_0esr_RELEASE`. Build tags
//! (`..._BUILD1`) and tags of other ESR lines are ignored.

use crate::artifacts::download::Downloader;
use crate::core::config::UpstreamConfig;
use crate::core::error::{BumpError, BumpResult, DownloadError};
use serde::{Deserialize, Serialize};

/// The newest upstream ESR release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamRelease {
  /// Number used as the patch component of the mozjs_sys version
  pub minor_patch: u64,
  /// Human-readable tag, e.g. `128.5.0esr`
  pub tag: String,
  /// Upstream changeset the release tag points at
  pub changeset: String,
}

/// Source of the latest upstream release
pub trait UpstreamSource {
  fn latest_release(&self) -> BumpResult<UpstreamRelease>;
}

/// `hg.mozilla.org` json-tags reader
pub struct HgUpstream {
  config: UpstreamConfig,
  http: Downloader,
}

impl HgUpstream {
  pub fn new(config: UpstreamConfig, http: Downloader) -> Self {
    Self { config, http }
  }
}

impl UpstreamSource for HgUpstream {
  fn latest_release(&self) -> BumpResult<UpstreamRelease> {
    let url = self.config.tags_url();
    let body = self.http.get_text(&url)?;
    latest_from_listing(&body, self.config.esr).map_err(|reason| {
      BumpError::Download(DownloadError::Parse {
        url: url.clone(),
        reason,
      })
    })
  }
}

#[derive(Debug, Deserialize)]
struct TagListing {
  tags: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
  tag: String,
  node: String,
}

/// Split `FIREFOX_<esr>_<minor>_<patch>esr_RELEASE` into `(minor, patch)`
fn parse_release_tag(tag: &str, esr: u64) -> Option<(u64, u64)> {
  let rest = tag.strip_prefix("FIREFOX_")?.strip_suffix("esr_RELEASE")?;
  let mut parts = rest.split('_');
  let major: u64 = parts.next()?.parse().ok()?;
  let minor: u64 = parts.next()?.parse().ok()?;
  let patch: u64 = parts.next()?.parse().ok()?;
  if parts.next().is_some() || major != esr {
    return None;
  }
  Some((minor, patch))
}

/// `minor` for `.0` releases, otherwise the digits of minor and patch joined
///
/// `None` when the joined number does not fit in a `u64`.
pub fn minor_patch_number(minor: u64, patch: u64) -> Option<u64> {
  if patch == 0 {
    return Some(minor);
  }
  let digits = patch.checked_ilog10().unwrap_or(0) + 1;
  10u64
    .checked_pow(digits)
    .and_then(|scale| minor.checked_mul(scale))
    .and_then(|shifted| shifted.checked_add(patch))
}

/// Pick the newest release tag for an ESR line out of a json-tags body
pub(crate) fn latest_from_listing(body: &str, esr: u64) -> Result<UpstreamRelease, String> {
  let listing: TagListing = serde_json::from_str(body).map_err(|e| format!("invalid json-tags listing: {}", e))?;

  let (minor, patch, node) = listing
    .tags
    .iter()
    .filter_map(|entry| parse_release_tag(&entry.tag, esr).map(|(minor, patch)| (minor, patch, &entry.node)))
    .max_by_key(|(minor, patch, _)| (*minor, *patch))
    .ok_or_else(|| format!("no FIREFOX_{}_*esr_RELEASE tag found", esr))?;

  if node.is_empty() {
    return Err(format!("release tag {}.{}.{}esr has no changeset", esr, minor, patch));
  }

  let minor_patch = minor_patch_number(minor, patch)
    .ok_or_else(|| format!("release tag {}.{}.{}esr is out of range", esr, minor, patch))?;

  Ok(UpstreamRelease {
    minor_patch,
    tag: format!("{}.{}.{}esr", esr, minor, patch),
    changeset: node.clone(),
  })
}
