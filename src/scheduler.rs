//! # Conversion scheduler
//!
//! Runs the per-image encoder invocations for one archive across a bounded
//! worker pool. Outcomes are collected in memory from the task join results;
//! the scheduler returns only after every dispatched task has finished, so
//! the decision stage never sees partial results.
//!
//! A successful conversion deletes its source image immediately, reclaiming
//! workspace before the repack stage. A failed conversion keeps the source
//! and lands in the failure set.
//!
//! The failure marker file inside the workspace is a persisted diagnostic: a
//! stale marker from an earlier aborted run is cleared before the batch
//! starts, and a fresh one listing every failed path is appended after it
//! finishes. Gating happens on the in-memory report, not on the file.

use crate::encoder::ImageEncoder;
use crate::progress::ProgressManager;
use anyhow::Result;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Marker file name inside the active workspace
pub const FAILURE_MARKER_NAME: &str = "webp_conversion_failed.log";

/// Aggregated outcome of one archive's conversion batch
#[derive(Debug)]
pub struct ConversionReport {
    /// Images whose encoder invocation failed; sources retained
    pub failed: Vec<PathBuf>,
    /// Number of images converted (sources deleted)
    pub converted: usize,
}

impl ConversionReport {
    pub fn all_converted(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Bounded-concurrency image conversion
pub struct ConversionScheduler {
    encoder: Arc<dyn ImageEncoder>,
    workers: usize,
}

impl ConversionScheduler {
    pub fn new(encoder: Arc<dyn ImageEncoder>, workers: usize) -> Self {
        Self { encoder, workers }
    }

    /// Convert every image, at most `workers` encoder processes at a time.
    ///
    /// Returns after all tasks have completed, success or failure. One slow
    /// conversion delays only the batch's completion, never its correctness.
    pub async fn convert_all(
        &self,
        workspace: &Path,
        images: Vec<PathBuf>,
    ) -> Result<ConversionReport> {
        let marker = workspace.join(FAILURE_MARKER_NAME);
        // a leftover marker from an earlier archive must not abort this one
        let _ = tokio::fs::remove_file(&marker).await;

        let progress = ProgressManager::conversion_bar(images.len() as u64);
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = Vec::with_capacity(images.len());

        for image in images {
            let permit = semaphore.clone().acquire_owned().await?;
            let encoder = Arc::clone(&self.encoder);
            let progress = progress.clone();

            let task = tokio::spawn(async move {
                let _permit = permit;
                let output = image.with_extension("webp");

                let outcome = match encoder.encode(&image, &output).await {
                    Ok(true) => {
                        if let Err(e) = tokio::fs::remove_file(&image).await {
                            warn!("failed to remove converted source {}: {}", image.display(), e);
                        }
                        None
                    }
                    Ok(false) => {
                        debug!("encoder exited nonzero for {}", image.display());
                        Some(image)
                    }
                    Err(e) => {
                        warn!("encoder invocation failed for {}: {}", image.display(), e);
                        Some(image)
                    }
                };

                progress.inc();
                outcome
            });

            tasks.push(task);
        }

        let total = tasks.len();
        let mut failed = Vec::new();
        for result in join_all(tasks).await {
            match result {
                Ok(Some(image)) => failed.push(image),
                Ok(None) => {}
                Err(e) => {
                    // a panicked task converted nothing; there is no path to
                    // attribute, the count mismatch below flags it
                    warn!("conversion task panicked: {}", e);
                }
            }
        }
        failed.sort();

        progress.finish();

        if !failed.is_empty() {
            self.append_marker(&marker, &failed).await?;
        }

        Ok(ConversionReport {
            converted: total - failed.len(),
            failed,
        })
    }

    async fn append_marker(&self, marker: &Path, failed: &[PathBuf]) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(marker)
            .await?;
        for image in failed {
            file.write_all(format!("{}\n", image.display()).as_bytes())
                .await?;
        }
        file.flush().await?;
        Ok(())
    }
}
