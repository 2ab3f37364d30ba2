//! texrender server
//!
//! HTTP boundary over the `latex-engine` conversion pipeline. Accepts raw
//! LaTeX source and returns a rendered artifact:
//!
//! - `POST /pdf` - compressed PDF
//! - `POST /png` - raster image (DPI fallback keeps it under the maximum
//!   dimension)
//! - `POST /svg` - vector image
//!
//! Classified pipeline failures come back as 200 with a plain-text status
//! narrative: the request was well-formed, the document content failed.
//! Malformed input is 400; infrastructure faults are 500.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use latex_engine::PipelineConfig;

mod api;
mod error;

use api::{handle_health, handle_render_pdf, handle_render_png, handle_render_svg};

/// Command-line arguments for the texrender server
#[derive(Parser, Debug)]
#[command(name = "texrender-server")]
#[command(about = "Render LaTeX source to PNG, SVG, or compressed PDF over HTTP")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Pipeline configuration: tool names, DPI ladder, raster limit.
    pub pipeline: Arc<PipelineConfig>,
}

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/pdf", post(handle_render_pdf))
        .route("/png", post(handle_render_png))
        .route("/svg", post(handle_render_svg))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = AppState {
        pipeline: Arc::new(PipelineConfig::default()),
    };

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!(
        "Max raster dimension: {}px, DPI ladder: {:?}",
        state.pipeline.max_raster_dimension, state.pipeline.densities
    );

    axum::serve(listener, app(state)).await?;

    Ok(())
}
