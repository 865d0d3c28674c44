//! Transform endpoint routes.

use axum::{extract::State, routing::post, Json, Router};
use whrow_engine::{IncomingEvent, TransformResult};

use crate::error::Result;
use crate::handlers::handle_transform;
use crate::AppState;

/// Create transform routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/transform", post(transform_handler))
}

/// POST /v1/transform - Transform a batch of events.
async fn transform_handler(
    State(state): State<AppState>,
    Json(events): Json<Vec<IncomingEvent>>,
) -> Result<Json<TransformResult>> {
    let response = handle_transform(&state.transformer, &events)?;
    Ok(Json(response))
}
