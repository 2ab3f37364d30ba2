//! Core pipeline flow
//!
//! One request moves through `Compiling` and then exactly one of
//! `Rasterizing`, `Vectorizing`, or `Compressing`. Every attempted step
//! appends a status line to the narrative trace; on failure the trace is
//! returned to the caller in place of artifact bytes. All stages within a
//! request run strictly sequentially; ladder rungs rewrite the same
//! output file.

use tracing::{debug, info, warn};

use super::classify::{classify, KnownFailure, StageKind, StageOutcome, COMPILED_PDF};
use super::errors::EngineError;
use super::output::OutputFormat;
use super::raster::png_dimensions;
use super::runner::{run_stage, StageResult};
use super::workspace::{Workspace, SOURCE_FILE};
use super::{Artifact, FailureKind, PipelineConfig, RenderFailure, RenderOutcome, RenderRequest};

/// Root name handed to `pdftoppm -singlefile`; it appends `.png`.
const RASTER_ROOT: &str = "render";

const LINE_DIMENSION_TOO_LARGE: &str = "Failed: Dimension too large";
const LINE_RASTER_TOO_LARGE: &str = "Failed: Output image too large";
const LINE_UNEXPECTED: &str = "Failed: An unexpected error occurred";

/// Render one document inside a fresh workspace.
///
/// Classified failures come back as [`RenderOutcome::Failure`]; only
/// infrastructure faults (spawn failure, workspace I/O) are `Err`. The
/// workspace is removed on every path; `Err` and cancellation are
/// covered by its drop guard.
pub async fn render_document(
    request: RenderRequest,
    config: &PipelineConfig,
) -> Result<RenderOutcome, EngineError> {
    info!(
        format = %request.format,
        source_bytes = request.source.len(),
        "render request"
    );

    let workspace = Workspace::acquire()?;
    let outcome = run_pipeline(&workspace, &request, config).await;
    workspace.release();
    outcome
}

async fn run_pipeline(
    workspace: &Workspace,
    request: &RenderRequest,
    config: &PipelineConfig,
) -> Result<RenderOutcome, EngineError> {
    workspace.write_source(&request.source)?;

    let mut trace = Trace::new();
    trace.step("Generating PDF...");
    let result = run_stage(
        &config.compiler,
        ["-interaction=nonstopmode", SOURCE_FILE],
        workspace.path(),
    )
    .await?;
    if let Some(failed) = check_stage(StageKind::Compile, &result, workspace, &mut trace) {
        return Ok(failed);
    }

    match request.format {
        OutputFormat::Png => rasterize(workspace, config, trace).await,
        OutputFormat::Svg => vectorize(workspace, config, trace).await,
        OutputFormat::Pdf => compress(workspace, config, trace).await,
    }
}

/// Raster branch: walk the descending DPI ladder until the produced image
/// fits the maximum dimension. The first satisfying rung wins.
async fn rasterize(
    workspace: &Workspace,
    config: &PipelineConfig,
    mut trace: Trace,
) -> Result<RenderOutcome, EngineError> {
    for density in config.densities.iter().copied() {
        trace.step(format!("Generating PNG at {density} DPI..."));
        let density_arg = density.to_string();
        let result = run_stage(
            &config.rasterizer,
            [
                "-png",
                "-r",
                density_arg.as_str(),
                "-singlefile",
                COMPILED_PDF,
                RASTER_ROOT,
            ],
            workspace.path(),
        )
        .await?;
        if let Some(failed) = check_stage(StageKind::Rasterize, &result, workspace, &mut trace) {
            return Ok(failed);
        }

        let bytes = workspace.read_file(StageKind::Rasterize.expected_output())?;
        match png_dimensions(&bytes) {
            Some((width, height))
                if width <= config.max_raster_dimension
                    && height <= config.max_raster_dimension =>
            {
                return Ok(RenderOutcome::Success(Artifact {
                    bytes,
                    mime_type: OutputFormat::Png.mime_type(),
                }));
            }
            Some((width, height)) => {
                debug!(density, width, height, "raster over limit, trying next rung");
            }
            None => {
                warn!(density, "rasterizer produced an unreadable PNG");
                return Ok(trace.fail(FailureKind::Unknown, LINE_UNEXPECTED));
            }
        }
    }

    Ok(trace.fail(FailureKind::RasterTooLarge, LINE_RASTER_TOO_LARGE))
}

/// Vector branch: single attempt, no resolution concept.
async fn vectorize(
    workspace: &Workspace,
    config: &PipelineConfig,
    mut trace: Trace,
) -> Result<RenderOutcome, EngineError> {
    trace.step("Generating SVG...");
    let result = run_stage(
        &config.vectorizer,
        ["-svg", COMPILED_PDF, StageKind::Vectorize.expected_output()],
        workspace.path(),
    )
    .await?;
    if let Some(failed) = check_stage(StageKind::Vectorize, &result, workspace, &mut trace) {
        return Ok(failed);
    }

    let bytes = workspace.read_file(StageKind::Vectorize.expected_output())?;
    Ok(RenderOutcome::Success(Artifact {
        bytes,
        mime_type: OutputFormat::Svg.mime_type(),
    }))
}

/// Compress branch: single size-reduction pass over the intermediate PDF.
async fn compress(
    workspace: &Workspace,
    config: &PipelineConfig,
    mut trace: Trace,
) -> Result<RenderOutcome, EngineError> {
    trace.step("Compressing PDF...");
    let output_arg = format!("-sOutputFile={}", StageKind::Compress.expected_output());
    let result = run_stage(
        &config.compressor,
        [
            "-sDEVICE=pdfwrite",
            "-dCompatibilityLevel=1.5",
            "-dPDFSETTINGS=/ebook",
            "-dNOPAUSE",
            "-dBATCH",
            "-dQUIET",
            output_arg.as_str(),
            COMPILED_PDF,
        ],
        workspace.path(),
    )
    .await?;
    if let Some(failed) = check_stage(StageKind::Compress, &result, workspace, &mut trace) {
        return Ok(failed);
    }

    let bytes = workspace.read_file(StageKind::Compress.expected_output())?;
    Ok(RenderOutcome::Success(Artifact {
        bytes,
        mime_type: OutputFormat::Pdf.mime_type(),
    }))
}

/// Classify a completed stage and turn a classified failure into a
/// terminal outcome. Returns `None` on success.
fn check_stage(
    kind: StageKind,
    result: &StageResult,
    workspace: &Workspace,
    trace: &mut Trace,
) -> Option<RenderOutcome> {
    match classify(kind, result, workspace) {
        StageOutcome::Success => None,
        StageOutcome::KnownFailure(KnownFailure::DimensionTooLarge) => {
            info!(stage = %kind, "document hit the compiler's dimension limit");
            Some(
                trace
                    .take()
                    .fail(FailureKind::DimensionTooLarge, LINE_DIMENSION_TOO_LARGE),
            )
        }
        StageOutcome::UnknownFailure { diagnostic } => {
            warn!(stage = %kind, %diagnostic, "stage failed");
            Some(trace.take().fail(FailureKind::Unknown, LINE_UNEXPECTED))
        }
    }
}

/// Accumulated status narrative: one short line per attempted step, in
/// execution order.
#[derive(Debug, Default)]
struct Trace {
    lines: Vec<String>,
}

impl Trace {
    fn new() -> Self {
        Self::default()
    }

    fn step(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn fail(mut self, kind: FailureKind, line: &str) -> RenderOutcome {
        self.lines.push(line.to_string());
        RenderOutcome::Failure(RenderFailure {
            kind,
            narrative: self.lines.join("\n"),
        })
    }

    fn take(&mut self) -> Trace {
        std::mem::take(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrative_preserves_step_order_and_ends_with_failure_line() {
        let mut trace = Trace::new();
        trace.step("Generating PDF...");
        trace.step("Generating PNG at 600 DPI...");
        let outcome = trace.fail(FailureKind::RasterTooLarge, LINE_RASTER_TOO_LARGE);

        match outcome {
            RenderOutcome::Failure(failure) => {
                assert_eq!(failure.kind, FailureKind::RasterTooLarge);
                assert_eq!(
                    failure.narrative,
                    "Generating PDF...\nGenerating PNG at 600 DPI...\nFailed: Output image too large"
                );
            }
            RenderOutcome::Success(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn dimension_failure_line_matches_the_documented_diagnostic() {
        let outcome = Trace::new().fail(FailureKind::DimensionTooLarge, LINE_DIMENSION_TOO_LARGE);
        match outcome {
            RenderOutcome::Failure(failure) => {
                assert!(failure.narrative.ends_with("Failed: Dimension too large"));
            }
            RenderOutcome::Success(_) => panic!("expected failure"),
        }
    }
}
