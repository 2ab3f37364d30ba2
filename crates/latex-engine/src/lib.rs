//! LaTeX document rendering engine
//!
//! This crate turns raw LaTeX source into a rendered artifact (PNG, SVG,
//! or compressed PDF) by orchestrating a chain of external tools:
//!
//! - `pdflatex` compiles the source to an intermediate PDF
//! - `pdftoppm` rasterizes the PDF, walking a descending DPI ladder until
//!   the image fits the maximum raster dimension
//! - `pdftocairo` converts the PDF to SVG
//! - `gs` produces a size-reduced PDF
//!
//! Every request runs inside an isolated scratch workspace that is removed
//! on all exit paths. Tool failures are classified into named outcomes
//! rather than raised as errors; only infrastructure faults (a tool that
//! cannot be started, workspace I/O) surface as [`pipeline::EngineError`].

pub mod pipeline;

pub use pipeline::{
    render_document, Artifact, EngineError, FailureKind, OutputFormat, PipelineConfig,
    RenderFailure, RenderOutcome, RenderRequest,
};
