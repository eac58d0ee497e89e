//! Progress display.
//!
//! Two bars, matching the two loops of the pipeline: an outer bar advancing
//! once per archive with the current archive name as its message, and an
//! inner bar counting images through the encoder pool. Log lines go through
//! `println` so they render above the bar instead of tearing it.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Wraps an indicatif bar for one loop of the pipeline
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Outer bar: one tick per archive
    pub fn batch_bar(total_archives: u64) -> Self {
        let bar = ProgressBar::new(total_archives);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.green/white}] {pos}/{len} archives {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Inner bar: one tick per image conversion
    pub fn conversion_bar(total_images: u64) -> Self {
        let bar = ProgressBar::new(total_images);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.blue} [{elapsed_precise}] [{bar:40.blue/white}] {pos}/{len} images")
                .unwrap()
                .progress_chars("=>-"),
        );
        Self { bar }
    }

    pub fn inc(&self) {
        self.bar.inc(1);
    }

    /// Show which archive is in flight without advancing the bar
    pub fn set_message(&self, message: String) {
        self.bar.set_message(message);
    }

    /// Print a line above the bar
    pub fn println(&self, line: &str) {
        self.bar.println(line);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
