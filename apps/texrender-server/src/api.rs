//! API handlers for the texrender server
//!
//! One handler per artifact route, all thin wrappers over
//! [`latex_engine::render_document`]. The handlers own request validation
//! and the outcome-to-response mapping; everything with design content
//! lives in the engine.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::info;

use latex_engine::{render_document, OutputFormat, RenderOutcome, RenderRequest};

use crate::error::ServerError;
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "texrender-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: POST /pdf
pub async fn handle_render_pdf(
    state: State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ServerError> {
    handle_render(state, headers, body, OutputFormat::Pdf).await
}

/// Handler: POST /png
pub async fn handle_render_png(
    state: State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ServerError> {
    handle_render(state, headers, body, OutputFormat::Png).await
}

/// Handler: POST /svg
pub async fn handle_render_svg(
    state: State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ServerError> {
    handle_render(state, headers, body, OutputFormat::Svg).await
}

async fn handle_render(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
    format: OutputFormat,
) -> Result<Response, ServerError> {
    validate_request(&headers, &body)?;

    let request = RenderRequest {
        source: body.to_vec(),
        format,
    };
    let outcome = render_document(request, &state.pipeline).await?;

    Ok(match outcome {
        RenderOutcome::Success(artifact) => {
            ([(header::CONTENT_TYPE, artifact.mime_type)], artifact.bytes).into_response()
        }
        RenderOutcome::Failure(failure) => {
            info!(kind = ?failure.kind, "render failed");
            (
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                failure.narrative,
            )
                .into_response()
        }
    })
}

/// Reject requests before any stage runs: empty bodies and declared
/// content types other than LaTeX source. A missing Content-Type is
/// accepted.
fn validate_request(headers: &HeaderMap, body: &Bytes) -> Result<(), ServerError> {
    if body.is_empty() {
        return Err(ServerError::InvalidInput("empty request body".to_string()));
    }

    if let Some(value) = headers.get(header::CONTENT_TYPE) {
        let content_type = value
            .to_str()
            .map_err(|_| ServerError::InvalidInput("unreadable content type".to_string()))?;
        if !is_tex_content_type(content_type) {
            return Err(ServerError::InvalidInput(format!(
                "unsupported content type '{content_type}', expected application/x-tex"
            )));
        }
    }

    Ok(())
}

/// `application/x-tex` or any `text/*` type counts as LaTeX source.
pub(crate) fn is_tex_content_type(value: &str) -> bool {
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/x-tex" || essence.starts_with("text/")
}
