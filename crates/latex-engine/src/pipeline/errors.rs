//! Infrastructure errors
//!
//! Classified stage failures are data ([`super::StageOutcome`],
//! [`super::RenderFailure`]), never errors. `EngineError` covers only the
//! cases where the pipeline machinery itself cannot run.

use thiserror::Error;

/// Faults in the invocation layer, not in the document being rendered.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to create workspace: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("Failed to start '{tool}': {source}")]
    ToolSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Workspace I/O error: {0}")]
    Io(#[from] std::io::Error),
}
