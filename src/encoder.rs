//! # Still-image encoder
//!
//! One encoder invocation per image, behind the [`ImageEncoder`] trait so the
//! scheduler can be tested without `cwebp` installed. A nonzero exit is not
//! an error at this layer; it is a per-image outcome the scheduler records.

use crate::config::Config;
use crate::error::PipelineError;
use crate::process::{run_tool_quiet, to_string_vec};
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// External single-frame image encoder interface
#[async_trait]
pub trait ImageEncoder: Send + Sync {
    /// Encode `input` to `output`. `Ok(true)` means the tool exited zero.
    async fn encode(&self, input: &Path, output: &Path) -> Result<bool>;
}

/// cwebp-backed implementation
pub struct Cwebp {
    quality: u8,
    effort: u8,
}

impl Cwebp {
    pub fn new(config: &Config) -> Self {
        Self {
            quality: config.webp_quality,
            effort: config.webp_effort,
        }
    }

    /// Verify the tool is present before the batch starts.
    pub async fn check_available() -> Result<()> {
        match run_tool_quiet("cwebp", &to_string_vec(["-version"])).await {
            Ok((true, _)) => Ok(()),
            _ => Err(PipelineError::MissingDependency("cwebp".to_string()).into()),
        }
    }
}

#[async_trait]
impl ImageEncoder for Cwebp {
    async fn encode(&self, input: &Path, output: &Path) -> Result<bool> {
        let args = to_string_vec([
            "-q",
            &self.quality.to_string(),
            "-m",
            &self.effort.to_string(),
            "-af",
            &input.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
        ]);

        let (success, _) = run_tool_quiet("cwebp", &args).await?;
        Ok(success)
    }
}
