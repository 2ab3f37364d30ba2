//! Stage execution
//!
//! Runs one external tool against the workspace and captures everything
//! the classifier needs. The invocation contract is non-throwing: a
//! nonzero exit is a normal, fully-captured result. Only the invocation
//! layer itself failing (executable missing, permission denied) is an
//! [`EngineError`].

use std::ffi::OsStr;
use std::path::Path;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::debug;

use super::errors::EngineError;

/// Captured result of one tool invocation. Immutable once produced;
/// consumed only by the classifier.
#[derive(Debug, Clone)]
pub struct StageResult {
    /// Exit code, or `None` if the tool was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl StageResult {
    pub fn exited_cleanly(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Run one tool to completion with `dir` as its working directory.
///
/// Output streams are fully buffered: stage output is small diagnostic
/// text, artifacts go to files. No wall-clock timeout is imposed; a
/// bounded per-stage timeout classifying as an unknown failure is the
/// natural extension point here.
pub async fn run_stage<I, S>(program: &str, args: I, dir: &Path) -> Result<StageResult, EngineError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let started = Instant::now();
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .await
        .map_err(|source| EngineError::ToolSpawn {
            tool: program.to_string(),
            source,
        })?;

    let result = StageResult {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        elapsed: started.elapsed(),
    };
    debug!(
        program,
        exit_code = ?result.exit_code,
        elapsed_ms = result.elapsed.as_millis() as u64,
        "stage finished"
    );
    Ok(result)
}
