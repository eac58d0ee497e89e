//! # Archive outcome store
//!
//! Keyed record store mapping archive path → last recorded outcome, persisted
//! as JSON in the invocation directory. Its one consumer today is the
//! eligibility check: an archive whose conversion already proved unproductive
//! ("size not reduced") is skipped on every future run without listing or
//! extracting it again.
//!
//! Keys are the resolved absolute path of the archive, so the cache survives
//! being invoked from different relative locations.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

/// Default store file name in the invocation directory
pub const OUTCOME_STORE_NAME: &str = "conversion_outcomes.json";

/// Why an archive's last processing attempt went nowhere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Conversion finished but saved less than the required margin
    SizeNotReduced,
}

/// One recorded outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveOutcome {
    pub kind: OutcomeKind,
    pub recorded_at: u64,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct OutcomeFile {
    outcomes: HashMap<String, ArchiveOutcome>,
}

/// Persistent archive-path → outcome store
pub struct OutcomeStore {
    store_path: PathBuf,
    state: OutcomeFile,
}

impl OutcomeStore {
    /// Load (or initialize) the store living in `dir`
    pub async fn open(dir: &Path) -> Result<Self> {
        let store_path = dir.join(OUTCOME_STORE_NAME);

        let state = if store_path.exists() {
            let content = fs::read_to_string(&store_path).await?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            OutcomeFile::default()
        };

        Ok(Self { store_path, state })
    }

    async fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.state)?;
        fs::write(&self.store_path, content).await?;
        Ok(())
    }

    fn key(archive: &Path) -> String {
        archive.to_string_lossy().into_owned()
    }

    /// Record that converting `archive` did not reduce its size
    pub async fn record_size_not_reduced(&mut self, archive: &Path) -> Result<()> {
        let recorded_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        self.state.outcomes.insert(
            Self::key(archive),
            ArchiveOutcome {
                kind: OutcomeKind::SizeNotReduced,
                recorded_at,
            },
        );
        self.save().await
    }

    /// Whether a prior run already proved conversion unproductive
    pub fn is_size_not_reduced(&self, archive: &Path) -> bool {
        self.state
            .outcomes
            .get(&Self::key(archive))
            .map(|o| o.kind == OutcomeKind::SizeNotReduced)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_record_and_query() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("book.zip");

        let mut store = OutcomeStore::open(dir.path()).await.unwrap();
        assert!(!store.is_size_not_reduced(&archive));

        store.record_size_not_reduced(&archive).await.unwrap();
        assert!(store.is_size_not_reduced(&archive));

        // a different archive is unaffected
        assert!(!store.is_size_not_reduced(&dir.path().join("other.zip")));
    }

    #[tokio::test]
    async fn test_store_survives_reload() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("book.zip");

        {
            let mut store = OutcomeStore::open(dir.path()).await.unwrap();
            store.record_size_not_reduced(&archive).await.unwrap();
        }

        let store = OutcomeStore::open(dir.path()).await.unwrap();
        assert!(store.is_size_not_reduced(&archive));
    }

    #[tokio::test]
    async fn test_corrupt_store_resets_cleanly() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(OUTCOME_STORE_NAME), "not json").unwrap();

        let store = OutcomeStore::open(dir.path()).await.unwrap();
        assert!(!store.is_size_not_reduced(&dir.path().join("book.zip")));
    }
}
