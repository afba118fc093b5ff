//! Blocking HTTP client shared by upstream discovery and artifact downloads

use crate::core::error::{BumpError, BumpResult, DownloadError, ResultExt};
use crate::ui::progress::DownloadProgress;
use reqwest::blocking::{Client, Response};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

const CHUNK_SIZE: usize = 64 * 1024;

/// Thin wrapper over a blocking reqwest client
#[derive(Clone)]
pub struct Downloader {
  client: Client,
  show_progress: bool,
}

impl Downloader {
  pub fn new(show_progress: bool) -> BumpResult<Self> {
    let client = Client::builder()
      .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self { client, show_progress })
  }

  fn get(&self, url: &str) -> BumpResult<Response> {
    tracing::debug!(url, "GET");
    let response = self.client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
      return Err(BumpError::Download(DownloadError::Status {
        url: url.to_string(),
        status: status.as_u16(),
      }));
    }
    Ok(response)
  }

  /// Fetch a URL as text
  pub fn get_text(&self, url: &str) -> BumpResult<String> {
    let response = self.get(url)?;
    Ok(response.text()?)
  }

  /// Stream a URL into `dest`, drawing a progress bar when the size is known
  pub fn download_to(&self, url: &str, dest: &Path) -> BumpResult<()> {
    let mut response = self.get(url)?;
    let label = dest
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .unwrap_or_else(|| dest.display().to_string());
    let mut progress = match response.content_length() {
      Some(len) if self.show_progress => Some(DownloadProgress::new(len as usize, label)),
      _ => None,
    };

    let file = File::create(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
    let mut writer = BufWriter::new(file);
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0usize;

    loop {
      let read = response.read(&mut buf).map_err(|e| {
        BumpError::Download(DownloadError::Transport {
          url: url.to_string(),
          reason: e.to_string(),
        })
      })?;
      if read == 0 {
        break;
      }
      writer
        .write_all(&buf[..read])
        .with_context(|| format!("Failed to write {}", dest.display()))?;
      total += read;
      if let Some(progress) = progress.as_mut() {
        progress.inc_by(read);
      }
    }

    writer
      .flush()
      .with_context(|| format!("Failed to write {}", dest.display()))?;
    tracing::debug!(url, bytes = total, dest = %dest.display(), "downloaded");
    Ok(())
  }
}
