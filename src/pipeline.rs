//! # Pipeline orchestrator
//!
//! Drives one archive end to end: resolve → select and reset workspace →
//! eligibility → extract → convert → decide → repack and swap. Archives are
//! processed strictly one at a time; the only parallel region is the encoder
//! pool inside [`ConversionScheduler`].
//!
//! Every failure is contained to the archive being processed. The driving
//! loop logs it, purges the workspace (via the guard, on every exit path)
//! and moves on; one bad archive never aborts the batch.

use crate::archive::ArchiveEngine;
use crate::config::Config;
use crate::decision::{RepackDecision, RepackOutcome};
use crate::eligibility::EligibilityChecker;
use crate::encoder::ImageEncoder;
use crate::error_log::ErrorLog;
use crate::file_manager::FileManager;
use crate::outcomes::OutcomeStore;
use crate::progress::ProgressManager;
use crate::replace::ArchiveReplacer;
use crate::scheduler::ConversionScheduler;
use crate::stats::RunStats;
use crate::workspace::WorkspaceManager;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// How one archive's processing ended
#[derive(Debug)]
pub enum ArchiveReport {
    /// Converted, repacked and swapped in
    Completed {
        original_bytes: u64,
        converted_bytes: u64,
        elapsed: Duration,
    },
    /// Left untouched before any conversion work
    Skipped { reason: String },
    /// Conversion ran but the archive was left untouched
    Aborted { reason: String },
}

/// Drives archives through the conversion pipeline
pub struct PipelineOrchestrator {
    config: Config,
    engine: Arc<dyn ArchiveEngine>,
    encoder: Arc<dyn ImageEncoder>,
    workspaces: WorkspaceManager,
    error_log: ErrorLog,
    outcomes: OutcomeStore,
    invocation_dir: PathBuf,
}

impl PipelineOrchestrator {
    pub async fn new(
        config: Config,
        engine: Arc<dyn ArchiveEngine>,
        encoder: Arc<dyn ImageEncoder>,
        invocation_dir: &Path,
    ) -> Result<Self> {
        config.validate()?;
        let outcomes = OutcomeStore::open(invocation_dir).await?;
        let error_log = ErrorLog::in_dir(invocation_dir);
        let workspaces = WorkspaceManager::new(config.clone());

        Ok(Self {
            config,
            engine,
            encoder,
            workspaces,
            error_log,
            outcomes,
            invocation_dir: invocation_dir.to_path_buf(),
        })
    }

    /// Process the whole batch sequentially and fold per-archive reports
    /// into run statistics.
    pub async fn run(&mut self, archives: Vec<PathBuf>) -> Result<RunStats> {
        let progress = ProgressManager::batch_bar(archives.len() as u64);
        let mut stats = RunStats::new();

        for archive in archives {
            let name = archive
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| archive.display().to_string());
            progress.set_message(format!("processing {name}"));

            match self.process_archive(&archive).await {
                Ok(ArchiveReport::Completed {
                    original_bytes,
                    converted_bytes,
                    elapsed,
                }) => {
                    stats.add_completed(original_bytes, converted_bytes, elapsed);
                    progress.println(&format!(
                        "done: {name} ({} -> {}, {:.2} s)",
                        FileManager::format_size(original_bytes),
                        FileManager::format_size(converted_bytes),
                        elapsed.as_secs_f64()
                    ));
                }
                Ok(ArchiveReport::Skipped { reason }) => {
                    stats.add_skipped();
                    progress.println(&format!("skipped {name}: {reason}"));
                }
                Ok(ArchiveReport::Aborted { reason }) => {
                    stats.add_failed();
                    progress.println(&format!("aborted {name}: {reason}"));
                }
                Err(e) => {
                    stats.add_failed();
                    warn!("unexpected error processing {}: {:#}", archive.display(), e);
                    let _ = self
                        .error_log
                        .append(&format!("error processing {}: {e:#}", archive.display()))
                        .await;
                    progress.println(&format!("error: {name}"));
                }
            }

            progress.inc();
        }

        progress.finish();
        Ok(stats)
    }

    /// Drive a single archive through the pipeline.
    ///
    /// Returns `Ok` for every contained outcome; `Err` only for unexpected
    /// failures, which the driving loop logs and absorbs.
    pub async fn process_archive(&mut self, archive: &Path) -> Result<ArchiveReport> {
        let start = std::time::Instant::now();

        let archive = tokio::fs::canonicalize(archive)
            .await
            .unwrap_or_else(|_| archive.to_path_buf());
        let archive_size = tokio::fs::metadata(&archive).await?.len();

        let workspace = self.workspaces.select(archive_size);
        self.workspaces.reset(&workspace).await?;
        // purges the workspace on every exit path below, including `?`
        let _guard = self.workspaces.guard(&workspace);

        let checker = EligibilityChecker::new(self.engine.as_ref(), &self.outcomes);
        if let Some(reason) = checker.should_skip(&archive).await {
            info!("skipping {}: {}", archive.display(), reason);
            return Ok(ArchiveReport::Skipped {
                reason: reason.to_string(),
            });
        }

        info!("extracting {} -> {}", archive.display(), workspace.path.display());
        let extract_start = std::time::Instant::now();
        if let Err(e) = self.engine.extract(&archive, &workspace.path).await {
            self.error_log
                .append(&format!("extraction failed: {} ({e})", archive.display()))
                .await?;
            return Ok(ArchiveReport::Aborted {
                reason: format!("extraction failed: {e}"),
            });
        }
        info!("extraction took {:.2} s", extract_start.elapsed().as_secs_f64());

        let extracted_bytes = FileManager::directory_size(&workspace.path);
        info!(
            "extracted payload: {}",
            FileManager::format_size(extracted_bytes)
        );

        let images = FileManager::convertible_images(&workspace.path).await?;
        if images.is_empty() {
            return Ok(ArchiveReport::Skipped {
                reason: "no convertible images after extraction".to_string(),
            });
        }

        let workers = self.config.effective_workers();
        info!(
            "converting {} images (quality {}, {} workers)",
            images.len(),
            self.config.webp_quality,
            workers
        );
        let convert_start = std::time::Instant::now();
        let scheduler = ConversionScheduler::new(Arc::clone(&self.encoder), workers);
        let report = scheduler.convert_all(&workspace.path, images).await?;
        info!("conversion took {:.2} s", convert_start.elapsed().as_secs_f64());

        let outputs = FileManager::converted_outputs(&workspace.path).await?;
        let converted_bytes = FileManager::total_size(&outputs).await?;

        let decision = RepackDecision::new(self.config.size_reduction_ratio);
        match decision.decide(&report, &outputs, extracted_bytes, converted_bytes) {
            RepackOutcome::Proceed => {}
            RepackOutcome::AbortPartialFailure { failed } => {
                warn!(
                    "{}: {} images failed to convert, not repackaging",
                    archive.display(),
                    failed
                );
                return Ok(ArchiveReport::Aborted {
                    reason: format!("{failed} images failed to convert"),
                });
            }
            RepackOutcome::AbortNoOutputs => {
                self.error_log
                    .append(&format!("no converted output: {}", archive.display()))
                    .await?;
                return Ok(ArchiveReport::Aborted {
                    reason: "conversion produced no output files".to_string(),
                });
            }
            RepackOutcome::AbortSizeNotReduced {
                original,
                converted,
            } => {
                self.error_log
                    .append(&format!("size not reduced: {}", archive.display()))
                    .await?;
                self.outcomes.record_size_not_reduced(&archive).await?;
                return Ok(ArchiveReport::Aborted {
                    reason: format!(
                        "size not reduced ({} -> {})",
                        FileManager::format_size(original),
                        FileManager::format_size(converted)
                    ),
                });
            }
        }

        let replacer = ArchiveReplacer::new(self.engine.as_ref(), &self.config);
        let pack_start = std::time::Instant::now();
        match replacer
            .repack_and_swap(
                &workspace.path,
                &archive,
                archive_size,
                converted_bytes,
                &self.invocation_dir,
            )
            .await
        {
            Ok(final_size) => {
                info!(
                    "repack and swap took {:.2} s, final archive {}",
                    pack_start.elapsed().as_secs_f64(),
                    FileManager::format_size(final_size)
                );
                Ok(ArchiveReport::Completed {
                    original_bytes: extracted_bytes,
                    converted_bytes,
                    elapsed: start.elapsed(),
                })
            }
            Err(e) => {
                self.error_log
                    .append(&format!("replace failed: {} ({e})", archive.display()))
                    .await?;
                Ok(ArchiveReport::Aborted {
                    reason: format!("replace failed: {e}"),
                })
            }
        }
    }
}
