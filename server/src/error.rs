//! Unified error handling for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Engine error: {0}")]
    Engine(#[from] whrow_engine::Error),
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match &self {
            AppError::Engine(e) => {
                tracing::warn!("Engine error: {:?}", e);
                let details = match e {
                    whrow_engine::Error::UnknownDestination(_) => {
                        Some(format!("supported: {}", supported_destinations()))
                    }
                    whrow_engine::Error::InvalidConfig(_) => None,
                };
                (StatusCode::BAD_REQUEST, e.to_string(), details)
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            details,
        });

        (status, body).into_response()
    }
}

fn supported_destinations() -> String {
    whrow_engine::Dialect::names().collect::<Vec<_>>().join(", ")
}

/// Result type alias for handlers.
pub type Result<T> = std::result::Result<T, AppError>;
