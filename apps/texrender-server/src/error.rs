//! Error types for the texrender server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use latex_engine::EngineError;

/// Server error types.
///
/// Classified pipeline failures never appear here: the pipeline turns
/// them into structured outcomes the handlers map to 200 responses. This
/// covers malformed requests and infrastructure faults only.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ServerError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, format!("Invalid request: {msg}"))
            }
            ServerError::Engine(err) => {
                tracing::error!(%err, "pipeline infrastructure fault");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}
