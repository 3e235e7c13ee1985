//! HTTP route handlers for the Snapsong API
//!
//! This module contains all REST endpoint handlers including:
//! - Image analysis endpoints
//! - Health check and status endpoints

pub mod analyze;
pub mod health;

pub use analyze::{analyze_router, AnalyzeState};
pub use health::{health_router, HealthState};

use axum::{extract::DefaultBodyLimit, routing::get, Router};

/// Build the application router without the outer CORS and trace layers
pub fn app_router(
    analyze_state: AnalyzeState,
    health_state: HealthState,
    max_upload_bytes: usize,
) -> Router {
    Router::new()
        .route("/", get(root))
        .merge(analyze_router(analyze_state))
        // Nested health routes: /health, /health/live, /health/ready
        .nest("/health", health_router(health_state))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

async fn root() -> &'static str {
    "Welcome to Snapsong - Music for your pictures"
}
