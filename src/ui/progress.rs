//! Progress indicators for artifact downloads
//!
//! Uses `linya` for allocation-free progress bars

use linya::{Bar, Progress};

/// Progress bar for a single download, counted in bytes
pub struct DownloadProgress {
  progress: Progress,
  bar: Bar,
}

impl DownloadProgress {
  /// Create a new progress bar for `total` bytes
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self { progress, bar }
  }

  /// Advance by a number of bytes
  pub fn inc_by(&mut self, bytes: usize) {
    self.progress.inc_and_draw(&self.bar, bytes);
  }
}
