//! # Configuration
//!
//! All tuning values for the pipeline live here as fixed constants baked into
//! `Config::default()`. The command line only selects *what* to process; how
//! aggressively to encode, how many workers to run and where scratch space
//! lives are deployment decisions, not per-run flags.
//!
//! ## Size tiers
//! Three thresholds drive directory selection:
//! - `large_archive_threshold`: archives above this are extracted to the
//!   large working directory instead of the (capacity-constrained) default.
//! - `tmpfs_threshold`: repacked archives above this do not fit comfortably
//!   in the tmpfs-backed default directory.
//! - `archive_move_threshold`: repacked archives above this stay on the
//!   large-directory filesystem to avoid a cross-filesystem move.

use anyhow::Result;
use std::path::PathBuf;

/// Configuration for archive conversion
#[derive(Debug, Clone)]
pub struct Config {
    /// WebP encoder quality (1-100)
    pub webp_quality: u8,
    /// WebP encoder effort / method (`cwebp -m`, 0-6)
    pub webp_effort: u8,
    /// Maximum concurrent encoder processes
    pub workers: usize,
    /// Default (tmpfs-backed) working directory
    pub working_dir: PathBuf,
    /// Working directory for large archives
    pub large_working_dir: PathBuf,
    /// Archives larger than this extract to `large_working_dir`
    pub large_archive_threshold: u64,
    /// Repacked archives larger than this do not fit in tmpfs
    pub tmpfs_threshold: u64,
    /// Repacked archives larger than this stay on the large-dir filesystem
    pub archive_move_threshold: u64,
    /// Keep the repacked archive only if `new_size < original * ratio`
    pub size_reduction_ratio: f64,
}

const MB: u64 = 1024 * 1024;

impl Default for Config {
    fn default() -> Self {
        Self {
            webp_quality: 95,
            webp_effort: 6,
            workers: 9,
            working_dir: PathBuf::from("/dev/shm/archive-optimizer/work"),
            large_working_dir: PathBuf::from("/var/tmp/archive-optimizer/work"),
            large_archive_threshold: 800 * MB,
            tmpfs_threshold: 495 * MB,
            archive_move_threshold: 950 * MB,
            size_reduction_ratio: 0.95,
        }
    }
}

/// Maximum encoder processes regardless of configuration
pub const MAX_WORKERS: usize = 9;

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.webp_quality == 0 || self.webp_quality > 100 {
            return Err(anyhow::anyhow!("WebP quality must be between 1 and 100"));
        }

        if self.webp_effort > 6 {
            return Err(anyhow::anyhow!("WebP effort must be between 0 and 6"));
        }

        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(anyhow::anyhow!(
                "Number of workers must be between 1 and {}",
                MAX_WORKERS
            ));
        }

        if self.size_reduction_ratio <= 0.0 || self.size_reduction_ratio > 1.0 {
            return Err(anyhow::anyhow!(
                "Size reduction ratio must be between 0.0 and 1.0"
            ));
        }

        if self.working_dir == self.large_working_dir {
            return Err(anyhow::anyhow!(
                "Default and large working directories must differ"
            ));
        }

        Ok(())
    }

    /// Concurrency actually used for encoding, never above the hard cap
    pub fn effective_workers(&self) -> usize {
        self.workers.min(MAX_WORKERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.webp_quality = 0;
        assert!(config.validate().is_err());

        config.webp_quality = 95;
        config.workers = 0;
        assert!(config.validate().is_err());

        config.workers = MAX_WORKERS + 1;
        assert!(config.validate().is_err());

        config.workers = 4;
        config.size_reduction_ratio = 1.5;
        assert!(config.validate().is_err());

        config.size_reduction_ratio = 0.95;
        config.large_working_dir = config.working_dir.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.webp_quality, 95);
        assert_eq!(config.webp_effort, 6);
        assert_eq!(config.workers, 9);
        assert_eq!(config.large_archive_threshold, 800 * 1024 * 1024);
        assert_eq!(config.tmpfs_threshold, 495 * 1024 * 1024);
        assert_eq!(config.archive_move_threshold, 950 * 1024 * 1024);
        assert!((config.size_reduction_ratio - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn test_effective_workers_capped() {
        let config = Config {
            workers: 9,
            ..Default::default()
        };
        assert_eq!(config.effective_workers(), 9);

        let config = Config {
            workers: 3,
            ..Default::default()
        };
        assert_eq!(config.effective_workers(), 3);
    }
}
