//! # Archive engine
//!
//! The archive tool is a black box behind the [`ArchiveEngine`] trait: list
//! the entries of an archive, extract it flat into a directory, and build a
//! new archive from a set of files. The production implementation shells out
//! to 7-Zip (`7zz`); tests substitute an in-memory fake.
//!
//! Repacking always uses store mode (`-mx=0`): the payload at that point is
//! WebP, already entropy-coded, and deflating it again burns CPU for nothing.

use crate::error::PipelineError;
use crate::process::{run_tool, run_tool_quiet, to_string_vec};
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// External archive tool interface
#[async_trait]
pub trait ArchiveEngine: Send + Sync {
    /// List entry names inside an archive.
    async fn list(&self, archive: &Path) -> Result<Vec<String>>;

    /// Extract all entries (flattened) into `dest`.
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<()>;

    /// Build `dest` containing exactly `files`, store mode (no recompression).
    async fn create(&self, dest: &Path, files: &[PathBuf]) -> Result<()>;
}

/// 7-Zip backed implementation
pub struct SevenZip {
    program: String,
}

impl SevenZip {
    pub fn new() -> Self {
        Self {
            program: "7zz".to_string(),
        }
    }

    /// Verify the tool is present before the batch starts.
    pub async fn check_available(&self) -> Result<()> {
        match run_tool_quiet(&self.program, &to_string_vec(["i"])).await {
            Ok((true, _)) => Ok(()),
            _ => Err(PipelineError::MissingDependency(self.program.clone()).into()),
        }
    }
}

impl Default for SevenZip {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArchiveEngine for SevenZip {
    async fn list(&self, archive: &Path) -> Result<Vec<String>> {
        // -slt gives one "Path = ..." line per entry, -ba drops the banner
        let args = to_string_vec(["l", "-slt", "-ba", &archive.to_string_lossy()]);
        let out = run_tool(&self.program, &args).await?;

        if !out.success {
            return Err(PipelineError::ArchiveTool {
                operation: format!("list {}", archive.display()),
                detail: out.stderr.trim().to_string(),
            }
            .into());
        }

        let entries: Vec<String> = out
            .stdout
            .lines()
            .filter_map(|line| line.strip_prefix("Path = "))
            .map(|name| name.to_string())
            .collect();

        debug!("{}: {} entries listed", archive.display(), entries.len());
        Ok(entries)
    }

    async fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        let args = to_string_vec([
            "e",
            &archive.to_string_lossy(),
            &format!("-o{}", dest.display()),
            "-y",
        ]);
        let out = run_tool(&self.program, &args).await?;

        if !out.success {
            return Err(PipelineError::Extraction {
                archive: archive.to_path_buf(),
                detail: format!(
                    "exit code {:?}: {}",
                    out.code,
                    out.stderr.trim()
                ),
            }
            .into());
        }

        debug!("extracted {} in {:?}", archive.display(), out.elapsed);
        Ok(())
    }

    async fn create(&self, dest: &Path, files: &[PathBuf]) -> Result<()> {
        let mut args = to_string_vec(["a", "-mx=0", "-tzip", &dest.to_string_lossy()]);
        args.extend(files.iter().map(|f| f.to_string_lossy().into_owned()));

        let (success, elapsed) = run_tool_quiet(&self.program, &args).await?;
        if !success {
            return Err(PipelineError::ArchiveTool {
                operation: format!("create {}", dest.display()),
                detail: "packer exited with nonzero status".to_string(),
            }
            .into());
        }

        debug!("packed {} files into {} in {:?}", files.len(), dest.display(), elapsed);
        Ok(())
    }
}
