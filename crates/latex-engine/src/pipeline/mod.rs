//! The conversion pipeline: workspace lifecycle, stage execution,
//! outcome classification, and the per-format conversion flows.

pub mod classify;
pub mod errors;
pub mod output;
pub mod raster;
pub mod render;
pub mod runner;
pub mod workspace;

pub use classify::{classify, KnownFailure, StageKind, StageOutcome, DIMENSION_TOO_LARGE_MARKER};
pub use errors::EngineError;
pub use output::OutputFormat;
pub use raster::{png_dimensions, DENSITY_LADDER};
pub use render::render_document;
pub use runner::{run_stage, StageResult};
pub use workspace::Workspace;

/// Request to render a document.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    /// Raw LaTeX source bytes, written verbatim into the workspace.
    pub source: Vec<u8>,
    /// Requested artifact format.
    pub format: OutputFormat,
}

/// Pipeline configuration.
///
/// The defaults are the reference behavior; none of this is exposed as
/// runtime configuration. The tool fields exist so tests can point the
/// pipeline at stub executables.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum width/height of a produced raster, in pixels.
    pub max_raster_dimension: u32,
    /// Descending DPI ladder tried for raster output.
    pub densities: Vec<u32>,
    /// LaTeX compiler binary.
    pub compiler: String,
    /// PDF-to-PNG converter binary.
    pub rasterizer: String,
    /// PDF-to-SVG converter binary.
    pub vectorizer: String,
    /// PDF size-reduction binary.
    pub compressor: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_raster_dimension: 8192,
            densities: DENSITY_LADDER.to_vec(),
            compiler: "pdflatex".to_string(),
            rasterizer: "pdftoppm".to_string(),
            vectorizer: "pdftocairo".to_string(),
            compressor: "gs".to_string(),
        }
    }
}

/// Final output bytes plus their content type.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

/// Why a pipeline run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The compiler reported its "Dimension too large" limit.
    DimensionTooLarge,
    /// Every ladder rung produced a raster over the maximum dimension.
    RasterTooLarge,
    /// A stage failed its exit-status/output-existence checks without
    /// matching a known marker.
    Unknown,
}

/// A classified pipeline failure with the accumulated status narrative.
#[derive(Debug, Clone)]
pub struct RenderFailure {
    pub kind: FailureKind,
    /// One status line per attempted step, in execution order, ending
    /// with the failure line. Operators read this instead of re-running
    /// the pipeline.
    pub narrative: String,
}

/// Terminal state of one pipeline run.
#[derive(Debug, Clone)]
pub enum RenderOutcome {
    Success(Artifact),
    Failure(RenderFailure),
}
