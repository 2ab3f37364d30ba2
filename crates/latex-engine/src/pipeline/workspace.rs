//! Per-request scratch workspaces
//!
//! Every render request gets its own uniquely named directory holding the
//! source file and everything the external tools produce. The directory is
//! removed exactly once, on every exit path: [`Workspace::release`] covers
//! the normal paths with a logged best-effort removal, and the underlying
//! [`tempfile::TempDir`] drop guard covers panics and cancellation.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use super::errors::EngineError;

/// Fixed name of the source document inside a workspace. `pdflatex`
/// derives the intermediate PDF name from this basename.
pub const SOURCE_FILE: &str = "input.tex";

/// An isolated scratch directory, exclusively owned by one request.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh workspace. Temp-dir naming is collision-resistant,
    /// so concurrent requests need no further coordination.
    pub fn acquire() -> Result<Self, EngineError> {
        let dir = tempfile::Builder::new()
            .prefix("texrender-")
            .tempdir()
            .map_err(EngineError::Workspace)?;
        debug!(path = %dir.path().display(), "workspace acquired");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write the request's source document to [`SOURCE_FILE`]. Exactly one
    /// source document per workspace.
    pub fn write_source(&self, source: &[u8]) -> Result<(), EngineError> {
        std::fs::write(self.file(SOURCE_FILE), source)?;
        Ok(())
    }

    /// Absolute path of a file inside the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.file(name).is_file()
    }

    /// Read a produced file fully into memory. Artifact bytes must be in
    /// memory before the workspace is torn down.
    pub fn read_file(&self, name: &str) -> Result<Vec<u8>, EngineError> {
        Ok(std::fs::read(self.file(name))?)
    }

    /// Recursively remove the workspace. Removal failures are logged and
    /// never surface as request failures.
    pub fn release(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(err) = self.dir.close() {
            warn!(path = %path.display(), %err, "failed to remove workspace");
        } else {
            debug!(path = %path.display(), "workspace released");
        }
    }
}
