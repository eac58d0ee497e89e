//! # Archive replacement
//!
//! Builds the replacement archive from the converted outputs and swaps it in
//! for the original. The swap order is deliberate: the replacement must
//! exist, complete and non-empty, before the original is deleted. If the
//! build fails or produces nothing, the original is never touched.
//!
//! Output directory selection is a four-way choice keyed on the original's
//! size tier and the converted payload's size: small results land in tmpfs,
//! results too big for tmpfs land either in the invocation directory (small
//! originals, so the final move is a same-filesystem rename) or stay on the
//! large-directory filesystem (large originals, avoiding a cross-filesystem
//! copy of a near-gigabyte file).

use crate::archive::ArchiveEngine;
use crate::config::Config;
use crate::error::PipelineError;
use crate::file_manager::FileManager;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Builds and swaps in replacement archives
pub struct ArchiveReplacer<'a> {
    engine: &'a dyn ArchiveEngine,
    config: &'a Config,
}

impl<'a> ArchiveReplacer<'a> {
    pub fn new(engine: &'a dyn ArchiveEngine, config: &'a Config) -> Self {
        Self { engine, config }
    }

    /// Where the freshly packed archive should be written before the swap
    pub fn select_output_dir(
        &self,
        original_size: u64,
        converted_size: u64,
        invocation_dir: &Path,
    ) -> PathBuf {
        if original_size <= self.config.large_archive_threshold {
            if converted_size <= self.config.tmpfs_threshold {
                self.config.working_dir.clone()
            } else {
                invocation_dir.to_path_buf()
            }
        } else if converted_size < self.config.archive_move_threshold {
            self.config.working_dir.clone()
        } else {
            self.config.large_working_dir.clone()
        }
    }

    /// Pack the workspace's converted outputs and atomically replace
    /// `original`. Returns the final archive size.
    pub async fn repack_and_swap(
        &self,
        workspace: &Path,
        original: &Path,
        original_size: u64,
        converted_size: u64,
        invocation_dir: &Path,
    ) -> Result<u64> {
        let outputs = FileManager::converted_outputs(workspace).await?;
        if outputs.is_empty() {
            return Err(PipelineError::NothingToPack(original.to_path_buf()).into());
        }

        let output_dir = self.select_output_dir(original_size, converted_size, invocation_dir);
        fs::create_dir_all(&output_dir).await?;

        let stem = original
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "archive".to_string());
        let new_archive = output_dir.join(format!("{stem}_converted.zip"));

        info!("repacking {} files into {}", outputs.len(), new_archive.display());
        if let Err(e) = self.engine.create(&new_archive, &outputs).await {
            let _ = fs::remove_file(&new_archive).await;
            return Err(e);
        }

        // the original is deleted only once a complete replacement exists
        let final_size = match fs::metadata(&new_archive).await {
            Ok(meta) if meta.len() > 0 => meta.len(),
            _ => {
                let _ = fs::remove_file(&new_archive).await;
                return Err(PipelineError::EmptyBuild(new_archive).into());
            }
        };

        self.swap(&new_archive, original).await?;
        debug!(
            "replaced {} ({} -> {})",
            original.display(),
            FileManager::format_size(original_size),
            FileManager::format_size(final_size)
        );

        Ok(final_size)
    }

    async fn swap(&self, new_archive: &Path, original: &Path) -> Result<()> {
        fs::remove_file(original).await.map_err(|e| PipelineError::Swap {
            archive: original.to_path_buf(),
            detail: format!(
                "could not remove original: {e}; replacement left at {}",
                new_archive.display()
            ),
        })?;

        if fs::rename(new_archive, original).await.is_ok() {
            return Ok(());
        }

        // rename fails across filesystems; fall back to copy + remove
        match fs::copy(new_archive, original).await {
            Ok(_) => {
                let _ = fs::remove_file(new_archive).await;
                Ok(())
            }
            Err(e) => Err(PipelineError::Swap {
                archive: original.to_path_buf(),
                detail: format!(
                    "replacement stranded at {}: {e}",
                    new_archive.display()
                ),
            }
            .into()),
        }
    }
}
