//! Outcome classification
//!
//! A stage is defined to have succeeded only if it exited cleanly AND
//! produced its declared output file. Exit status alone is not enough:
//! `pdflatex` in non-stop mode tolerates many errors and can exit 0
//! without a usable PDF. Known failure modes are recognized first, by
//! substring markers in the captured output, regardless of exit status.

use super::runner::StageResult;
use super::workspace::Workspace;

/// Compiler warning emitted when a rendered box exceeds its internal
/// dimension limit. The compiler may still exit 0 while emitting this, so
/// the marker check takes precedence over the exit status.
///
/// A substring match on tool output is brittle (locale and version
/// dependent); keeping it as one named rule here lets it be swapped for
/// log parsing without touching pipeline control flow.
pub const DIMENSION_TOO_LARGE_MARKER: &str = "Dimension too large";

/// Name of the intermediate PDF produced by the compile stage; derived by
/// `pdflatex` from [`super::workspace::SOURCE_FILE`].
pub const COMPILED_PDF: &str = "input.pdf";
/// Raster produced by `pdftoppm -singlefile` from the `render` root.
pub const RASTER_FILE: &str = "render.png";
/// Vector output of `pdftocairo -svg`.
pub const VECTOR_FILE: &str = "render.svg";
/// Size-reduced PDF written by `gs`.
pub const COMPRESSED_PDF: &str = "compressed.pdf";

/// One external-tool invocation within the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Compile,
    Rasterize,
    Vectorize,
    Compress,
}

impl StageKind {
    /// The file this stage must leave in the workspace to count as
    /// having succeeded.
    pub fn expected_output(&self) -> &'static str {
        match self {
            StageKind::Compile => COMPILED_PDF,
            StageKind::Rasterize => RASTER_FILE,
            StageKind::Vectorize => VECTOR_FILE,
            StageKind::Compress => COMPRESSED_PDF,
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StageKind::Compile => "compile",
            StageKind::Rasterize => "rasterize",
            StageKind::Vectorize => "vectorize",
            StageKind::Compress => "compress",
        };
        f.write_str(name)
    }
}

/// Named, expected failure modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownFailure {
    DimensionTooLarge,
}

/// Classified result of a completed stage. Drives pipeline branching;
/// never retried automatically except by the DPI ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Success,
    KnownFailure(KnownFailure),
    UnknownFailure { diagnostic: String },
}

/// Classify a completed stage, in precedence order: known marker in the
/// captured stdout, then the exit-status/output-existence double check.
pub fn classify(kind: StageKind, result: &StageResult, workspace: &Workspace) -> StageOutcome {
    if result.stdout.contains(DIMENSION_TOO_LARGE_MARKER) {
        return StageOutcome::KnownFailure(KnownFailure::DimensionTooLarge);
    }

    if !result.exited_cleanly() || !workspace.has_file(kind.expected_output()) {
        return StageOutcome::UnknownFailure {
            diagnostic: diagnostic_for(kind, result),
        };
    }

    StageOutcome::Success
}

/// Operator-facing diagnostic for an unknown failure: stage name, exit
/// code, and the tail of both output streams. Logged, not returned to
/// callers.
fn diagnostic_for(kind: StageKind, result: &StageResult) -> String {
    let mut diagnostic = match result.exit_code {
        Some(code) => format!("{kind} stage failed (exit {code})"),
        None => format!("{kind} stage killed by signal"),
    };
    let stdout = tail(&result.stdout);
    if !stdout.is_empty() {
        diagnostic.push_str("; stdout: ");
        diagnostic.push_str(stdout);
    }
    let stderr = tail(&result.stderr);
    if !stderr.is_empty() {
        diagnostic.push_str("; stderr: ");
        diagnostic.push_str(stderr);
    }
    diagnostic
}

/// Last few hundred bytes of a stream, trimmed. Tool output ends with the
/// interesting part.
fn tail(text: &str) -> &str {
    const TAIL_BYTES: usize = 400;
    let trimmed = text.trim();
    if trimmed.len() <= TAIL_BYTES {
        return trimmed;
    }
    let mut start = trimmed.len() - TAIL_BYTES;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    &trimmed[start..]
}
