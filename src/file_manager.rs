//! # File discovery and classification
//!
//! Helpers shared across the pipeline: finding archives to process, deciding
//! which extracted entries are convertible raster images, measuring extracted
//! payloads and formatting sizes for humans.
//!
//! Extension checks are case-insensitive everywhere. GIF is singled out
//! because feeding an animation through a single-frame encoder keeps only
//! the first frame and silently corrupts the rest.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// Extensions accepted for conversion
const RASTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
/// Extensions that disqualify an archive outright
const ANIMATED_EXTENSIONS: &[&str] = &["gif"];

/// Manages file discovery and classification
pub struct FileManager;

impl FileManager {
    /// Find archives to process: the explicit path if given, otherwise every
    /// `.zip` in `dir` (non-recursive, stable order).
    pub fn find_archives(dir: &Path, explicit: Option<&Path>) -> Result<Vec<PathBuf>> {
        if let Some(path) = explicit {
            return Ok(vec![path.to_path_buf()]);
        }

        let mut archives: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && Self::has_extension(p, &["zip"]))
            .collect();
        archives.sort();

        Ok(archives)
    }

    /// Check if a path (or archive entry name) is a convertible raster image
    pub fn is_convertible_image(name: &str) -> bool {
        Self::name_has_extension(name, RASTER_EXTENSIONS)
    }

    /// Check if a path (or archive entry name) is an animated format
    pub fn is_animated(name: &str) -> bool {
        Self::name_has_extension(name, ANIMATED_EXTENSIONS)
    }

    fn name_has_extension(name: &str, extensions: &[&str]) -> bool {
        let lower = name.trim().to_lowercase();
        extensions.iter().any(|ext| lower.ends_with(&format!(".{ext}")))
    }

    fn has_extension(path: &Path, extensions: &[&str]) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| extensions.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Convertible images sitting directly in a workspace (extraction is flat)
    pub async fn convertible_images(workspace: &Path) -> Result<Vec<PathBuf>> {
        let mut images = Vec::new();
        let mut entries = fs::read_dir(workspace).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_file() && Self::has_extension(&path, RASTER_EXTENSIONS) {
                images.push(path);
            }
        }
        images.sort();

        Ok(images)
    }

    /// Converted outputs sitting directly in a workspace
    pub async fn converted_outputs(workspace: &Path) -> Result<Vec<PathBuf>> {
        let mut outputs = Vec::new();
        let mut entries = fs::read_dir(workspace).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_file() && Self::has_extension(&path, &["webp"]) {
                outputs.push(path);
            }
        }
        outputs.sort();

        Ok(outputs)
    }

    /// Total size of all files under a directory, recursive
    pub fn directory_size(dir: &Path) -> u64 {
        WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.metadata().ok())
            .map(|m| m.len())
            .sum()
    }

    /// Total size of a list of files
    pub async fn total_size(files: &[PathBuf]) -> Result<u64> {
        let mut total = 0;
        for file in files {
            total += fs::metadata(file).await?.len();
        }
        Ok(total)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}
