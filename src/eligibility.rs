//! # Eligibility check
//!
//! Decides, before any extraction happens, whether an archive is worth
//! processing at all. The checks are ordered from cheapest to most
//! expensive: the outcome store lookup costs nothing and avoids invoking the
//! archive tool for archives already proven unproductive.
//!
//! A listing failure fails closed: an archive we cannot inspect is skipped,
//! never guessed at.

use crate::archive::ArchiveEngine;
use crate::file_manager::FileManager;
use crate::outcomes::OutcomeStore;
use std::fmt;
use std::path::Path;
use tracing::warn;

/// Why an archive was skipped without processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A previous run recorded "size not reduced" for this archive
    PreviouslyUnproductive,
    /// The archive tool could not list the contents
    ListingFailed(String),
    /// No JPG/PNG entries to convert
    NoConvertibleImages,
    /// Contains GIF entries; a still encoder would corrupt animations
    ContainsAnimated,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreviouslyUnproductive => {
                write!(f, "conversion previously did not reduce size")
            }
            Self::ListingFailed(detail) => write!(f, "could not list contents: {detail}"),
            Self::NoConvertibleImages => write!(f, "no JPG/PNG images inside"),
            Self::ContainsAnimated => write!(f, "contains GIF entries"),
        }
    }
}

/// Inspects archives and decides skip vs. process
pub struct EligibilityChecker<'a> {
    engine: &'a dyn ArchiveEngine,
    outcomes: &'a OutcomeStore,
}

impl<'a> EligibilityChecker<'a> {
    pub fn new(engine: &'a dyn ArchiveEngine, outcomes: &'a OutcomeStore) -> Self {
        Self { engine, outcomes }
    }

    /// Returns the reason to skip, or `None` if the archive should be
    /// processed. Does not mutate any persistent state.
    pub async fn should_skip(&self, archive: &Path) -> Option<SkipReason> {
        if self.outcomes.is_size_not_reduced(archive) {
            return Some(SkipReason::PreviouslyUnproductive);
        }

        let entries = match self.engine.list(archive).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("listing {} failed: {}", archive.display(), e);
                return Some(SkipReason::ListingFailed(e.to_string()));
            }
        };

        if !entries.iter().any(|name| FileManager::is_convertible_image(name)) {
            return Some(SkipReason::NoConvertibleImages);
        }

        if entries.iter().any(|name| FileManager::is_animated(name)) {
            return Some(SkipReason::ContainsAnimated);
        }

        None
    }
}
