//! # Archive WebP Optimizer
//!
//! Batch-converts archives of raster images (JPEG/PNG) to WebP, repacking
//! each archive only when the conversion yields a real size reduction and
//! never risking the original: the source archive is replaced only after a
//! complete, non-empty replacement exists.
//!
//! ## Module map
//! - `config`: fixed tuning constants and validation
//! - `process`: external tool invocation wrapper
//! - `archive` / `encoder`: the two external tools behind async traits
//! - `eligibility`: skip-or-process decision before extraction
//! - `workspace`: size-tiered scratch directories with purge-on-drop
//! - `scheduler`: bounded-concurrency image conversion
//! - `decision`: size-gated repack-or-discard verdict
//! - `replace`: store-mode repack and atomic swap
//! - `pipeline`: per-archive orchestration and the batch loop
//! - `error_log` / `outcomes`: durable diagnostics and the skip cache
//! - `stats` / `progress`: run statistics and bars

pub mod archive;
pub mod config;
pub mod decision;
pub mod eligibility;
pub mod encoder;
pub mod error;
pub mod error_log;
pub mod file_manager;
pub mod outcomes;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod replace;
pub mod scheduler;
pub mod stats;
pub mod workspace;

pub use archive::{ArchiveEngine, SevenZip};
pub use config::Config;
pub use encoder::{Cwebp, ImageEncoder};
pub use error::PipelineError;
pub use pipeline::{ArchiveReport, PipelineOrchestrator};
pub use stats::RunStats;
