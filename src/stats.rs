//! Run-level statistics.
//!
//! The driving loop folds one [`crate::pipeline::ArchiveReport`] per archive
//! into this accumulator; only archives that completed the full
//! convert-repack-swap cycle count. Printed once at shutdown.

use crate::file_manager::FileManager;
use std::time::Duration;

/// Statistics accumulated over one batch run
#[derive(Debug, Default)]
pub struct RunStats {
    pub archives_processed: usize,
    pub archives_skipped: usize,
    pub archives_failed: usize,
    pub total_original_bytes: u64,
    pub total_converted_bytes: u64,
    pub total_processing_time: Duration,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_completed(&mut self, original_bytes: u64, converted_bytes: u64, elapsed: Duration) {
        self.archives_processed += 1;
        self.total_original_bytes += original_bytes;
        self.total_converted_bytes += converted_bytes;
        self.total_processing_time += elapsed;
    }

    pub fn add_skipped(&mut self) {
        self.archives_skipped += 1;
    }

    pub fn add_failed(&mut self) {
        self.archives_failed += 1;
    }

    pub fn average_processing_time(&self) -> Duration {
        if self.archives_processed == 0 {
            Duration::ZERO
        } else {
            self.total_processing_time / self.archives_processed as u32
        }
    }

    pub fn reduction_percent(&self) -> f64 {
        FileManager::calculate_reduction(self.total_original_bytes, self.total_converted_bytes)
    }

    /// Final summary block printed to stdout at shutdown
    pub fn format_summary(&self) -> String {
        if self.archives_processed == 0 {
            return "Statistics: no archives were processed.".to_string();
        }

        format!(
            "Statistics:\n\
             - archives processed: {}\n\
             - average processing time: {:.2} s\n\
             - total original size: {}\n\
             - total converted size: {}\n\
             - size reduction: {:.2}%",
            self.archives_processed,
            self.average_processing_time().as_secs_f64(),
            FileManager::format_size(self.total_original_bytes),
            FileManager::format_size(self.total_converted_bytes),
            self.reduction_percent(),
        )
    }
}
