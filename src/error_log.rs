//! Append-only error log.
//!
//! One timestamped line per event, written to `conversion_errors.log` in the
//! invocation directory. This file is for humans and for post-mortems; the
//! machine-readable skip cache lives in [`crate::outcomes`].

use anyhow::Result;
use chrono::Local;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Default log file name in the invocation directory
pub const ERROR_LOG_NAME: &str = "conversion_errors.log";

/// Durable, append-only diagnostic log
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    /// Log living in `dir` under the default name
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(ERROR_LOG_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line
    pub async fn append(&self, message: &str) -> Result<()> {
        let line = format!("{} - {}\n", Local::now().format("%Y-%m-%d %H:%M:%S"), message);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_append_accumulates_lines() {
        let dir = TempDir::new().unwrap();
        let log = ErrorLog::in_dir(dir.path());

        log.append("extraction failed: a.zip").await.unwrap();
        log.append("size not reduced: b.zip").await.unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("extraction failed: a.zip"));
        assert!(lines[1].ends_with("size not reduced: b.zip"));
        // every line carries a timestamp prefix
        assert!(lines.iter().all(|l| l.contains(" - ")));
    }
}
