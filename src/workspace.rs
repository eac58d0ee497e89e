//! # Workspace management
//!
//! One scratch directory per archive, chosen by size tier: small archives
//! extract to the tmpfs-backed default directory, archives over the tier
//! threshold go to the large directory so they cannot exhaust tmpfs.
//!
//! The workspace is reset (emptied and recreated) before every archive and
//! purged afterwards on every exit path. Purge-on-every-path is enforced by
//! [`WorkspaceGuard`], which removes the directory on drop rather than
//! relying on cleanup calls sprinkled through the pipeline logic.

use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Size-based working directory bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    /// Fits in the tmpfs-backed default directory
    Default,
    /// Needs the capacity of the large directory
    Large,
}

impl SizeTier {
    /// Classify an archive by its on-disk size
    pub fn classify(archive_size: u64, config: &Config) -> Self {
        if archive_size <= config.large_archive_threshold {
            Self::Default
        } else {
            Self::Large
        }
    }
}

/// The active scratch directory for one archive
#[derive(Debug, Clone)]
pub struct Workspace {
    pub path: PathBuf,
    pub tier: SizeTier,
}

/// Selects, resets and purges workspaces
pub struct WorkspaceManager {
    config: Config,
}

impl WorkspaceManager {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Pick the workspace for an archive of the given size
    pub fn select(&self, archive_size: u64) -> Workspace {
        let tier = SizeTier::classify(archive_size, &self.config);
        let path = match tier {
            SizeTier::Default => self.config.working_dir.clone(),
            SizeTier::Large => self.config.large_working_dir.clone(),
        };
        Workspace { path, tier }
    }

    /// Empty and recreate a workspace. Stale files from a previous run must
    /// never leak into the next archive's image set.
    pub async fn reset(&self, workspace: &Workspace) -> Result<()> {
        let _ = tokio::fs::remove_dir_all(&workspace.path).await;
        tokio::fs::create_dir_all(&workspace.path).await?;
        debug!("workspace reset: {}", workspace.path.display());
        Ok(())
    }

    /// Arm a guard that purges the workspace when dropped
    pub fn guard(&self, workspace: &Workspace) -> WorkspaceGuard {
        WorkspaceGuard {
            path: workspace.path.clone(),
        }
    }
}

/// Removes the workspace directory on drop, best effort.
///
/// Drop runs on every exit path of the per-archive scope, including early
/// skips and error returns, so the purge cannot be forgotten.
pub struct WorkspaceGuard {
    path: PathBuf,
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                warn!("failed to purge workspace {}: {}", self.path.display(), e);
            } else {
                debug!("workspace purged: {}", self.path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn test_config(root: &Path) -> Config {
        Config {
            working_dir: root.join("work"),
            large_working_dir: root.join("work-large"),
            ..Default::default()
        }
    }

    #[test]
    fn test_tier_selection() {
        let root = TempDir::new().unwrap();
        let config = test_config(root.path());
        let manager = WorkspaceManager::new(config.clone());

        let small = manager.select(100);
        assert_eq!(small.tier, SizeTier::Default);
        assert_eq!(small.path, config.working_dir);

        // boundary: exactly at the threshold still counts as default
        let at_edge = manager.select(config.large_archive_threshold);
        assert_eq!(at_edge.tier, SizeTier::Default);

        let big = manager.select(config.large_archive_threshold + 1);
        assert_eq!(big.tier, SizeTier::Large);
        assert_eq!(big.path, config.large_working_dir);
    }

    #[tokio::test]
    async fn test_reset_clears_stale_files() {
        let root = TempDir::new().unwrap();
        let manager = WorkspaceManager::new(test_config(root.path()));
        let workspace = manager.select(100);

        manager.reset(&workspace).await.unwrap();
        std::fs::write(workspace.path.join("stale.jpg"), b"x").unwrap();

        manager.reset(&workspace).await.unwrap();
        assert!(workspace.path.exists());
        assert_eq!(std::fs::read_dir(&workspace.path).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_guard_purges_on_drop() {
        let root = TempDir::new().unwrap();
        let manager = WorkspaceManager::new(test_config(root.path()));
        let workspace = manager.select(100);
        manager.reset(&workspace).await.unwrap();
        std::fs::write(workspace.path.join("a.webp"), b"x").unwrap();

        {
            let _guard = manager.guard(&workspace);
        }
        assert!(!workspace.path.exists());
    }
}
