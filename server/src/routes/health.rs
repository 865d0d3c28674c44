//! Service status and the destinations it can transform for.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use whrow_engine::{dialect::Casing, Dialect, TransformerConfig};

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub transformer: TransformerConfig,
    pub dialects: Vec<DialectInfo>,
}

/// What a client needs to know about one destination type.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialectInfo {
    pub name: &'static str,
    pub uppercase: bool,
    pub max_identifier_len: usize,
    pub id_resolution: bool,
    pub datalake: bool,
}

impl From<&Dialect> for DialectInfo {
    fn from(dialect: &Dialect) -> Self {
        Self {
            name: dialect.name,
            uppercase: dialect.casing == Casing::Upper,
            max_identifier_len: dialect.max_identifier_len,
            id_resolution: dialect.id_resolution,
            datalake: dialect.datalake,
        }
    }
}

/// Create health routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        transformer: state.transformer.config().clone(),
        dialects: Dialect::all().iter().map(DialectInfo::from).collect(),
    })
}

async fn root() -> String {
    format!(
        "whrow {}: POST /v1/transform for {}",
        env!("CARGO_PKG_VERSION"),
        Dialect::names().collect::<Vec<_>>().join(", ")
    )
}
