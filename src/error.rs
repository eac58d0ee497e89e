//! Typed errors for the conversion pipeline.
//!
//! Most failures are contained to the archive being processed and surface as
//! logged skip reasons rather than propagated errors; the variants here cover
//! the cases where a stage genuinely cannot continue and the orchestrator
//! needs to know which stage gave up.

use std::path::PathBuf;

/// Custom error types for archive conversion
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("archive tool failed ({operation}): {detail}")]
    ArchiveTool { operation: String, detail: String },

    #[error("extraction failed for {archive}: {detail}")]
    Extraction { archive: PathBuf, detail: String },

    #[error("no converted output files to pack for {0}")]
    NothingToPack(PathBuf),

    #[error("replacement archive was built empty: {0}")]
    EmptyBuild(PathBuf),

    #[error("could not move replacement into place for {archive}: {detail}")]
    Swap { archive: PathBuf, detail: String },

    #[error("dependency missing: {0}")]
    MissingDependency(String),
}
