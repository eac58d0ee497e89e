//! # External process runner
//!
//! Every external tool (the archive engine, the WebP encoder) is invoked
//! through this one wrapper so exit status, captured output and elapsed time
//! are handled uniformly. Nothing in the crate parses image or archive data
//! itself; the heavy lifting is delegated to specialized tools.

use anyhow::Result;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Result of one external tool invocation
#[derive(Debug)]
pub struct ToolOutput {
    /// Whether the process exited with status zero
    pub success: bool,
    /// Raw exit code, if the process exited normally
    pub code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
    /// Wall-clock time spent in the process
    pub elapsed: Duration,
}

/// Run a tool capturing stdout/stderr.
pub async fn run_tool(program: &str, args: &[String]) -> Result<ToolOutput> {
    let start = std::time::Instant::now();
    let output = Command::new(program).args(args).output().await?;
    let elapsed = start.elapsed();

    debug!(
        "{} exited with {:?} in {:?}",
        program,
        output.status.code(),
        elapsed
    );

    Ok(ToolOutput {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        elapsed,
    })
}

/// Run a tool discarding its output, returning only success and timing.
///
/// Used for the encoder and the packer, whose stdout is pure noise at the
/// volumes this pipeline runs them.
pub async fn run_tool_quiet(program: &str, args: &[String]) -> Result<(bool, Duration)> {
    let start = std::time::Instant::now();
    let status = Command::new(program)
        .args(args)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await?;
    let elapsed = start.elapsed();

    debug!("{} exited with {:?} in {:?}", program, status.code(), elapsed);

    Ok((status.success(), elapsed))
}

/// Converts an iterable of string-like items to `Vec<String>`.
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_string_vec_mixed_types() {
        let quality = 95;
        let result = to_string_vec(["-q", &quality.to_string(), "-af"]);
        assert_eq!(
            result,
            vec!["-q".to_string(), "95".to_string(), "-af".to_string()]
        );
    }

    #[tokio::test]
    async fn test_run_tool_captures_output_and_status() {
        let out = run_tool("sh", &to_string_vec(["-c", "echo hello; exit 0"]))
            .await
            .unwrap();
        assert!(out.success);
        assert_eq!(out.code, Some(0));
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_run_tool_nonzero_exit() {
        let out = run_tool("sh", &to_string_vec(["-c", "exit 3"])).await.unwrap();
        assert!(!out.success);
        assert_eq!(out.code, Some(3));
    }

    #[tokio::test]
    async fn test_run_tool_quiet() {
        let (ok, _) = run_tool_quiet("sh", &to_string_vec(["-c", "exit 0"]))
            .await
            .unwrap();
        assert!(ok);

        let (ok, _) = run_tool_quiet("sh", &to_string_vec(["-c", "exit 1"]))
            .await
            .unwrap();
        assert!(!ok);
    }
}
