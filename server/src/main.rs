//! Whrow Server - HTTP front for the warehouse event transformer.
//!
//! Accepts batches of analytics events on `POST /v1/transform` and answers with
//! the rows produced by `whrow-engine`, plus a per-event list of failures.

mod config;
mod error;
mod handlers;
mod routes;

use crate::config::Config;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use whrow_engine::Transformer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub transformer: Arc<Transformer>,
}

impl AppState {
    fn new(config: &Config) -> Self {
        Self {
            transformer: Arc::new(Transformer::new(config.transformer.clone())),
        }
    }
}

fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "whrow_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting Whrow Server on {}:{}", config.host, config.port);
    tracing::debug!(transformer = ?config.transformer, "Transformer settings");

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(&config);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
