use axum::http::{header, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snapsong_api::config::Config;
use snapsong_api::routes::{app_router, AnalyzeState, HealthState};
use snapsong_api::services::recommendation::taxonomy;
use snapsong_api::services::{HealthService, RecommendationService, VisionService};
use snapsong_ollama_client::OllamaClient;
use snapsong_spotify_client::SpotifyClient;

/// Build the CORS layer based on configuration.
///
/// In production mode:
/// - If `CORS_ORIGINS` is set, only those origins are allowed
/// - If `CORS_ORIGINS` is not set, CORS requests are rejected (no origins allowed)
///
/// In development mode:
/// - If `CORS_ORIGINS` is set, those origins are used
/// - If `CORS_ORIGINS` is not set, permissive CORS is used for convenience
fn build_cors_layer(config: &Config) -> CorsLayer {
    match &config.cors_allowed_origins {
        Some(origins) if !origins.is_empty() => {
            let allowed_origins: Vec<_> = origins
                .iter()
                .filter_map(|origin| {
                    origin.parse().ok().or_else(|| {
                        tracing::warn!("Invalid CORS origin '{}', skipping", origin);
                        None
                    })
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::error!("No valid CORS origins configured, CORS requests will be rejected");
                CorsLayer::new()
            } else {
                tracing::info!(
                    "CORS configured with {} allowed origin(s): {:?}",
                    allowed_origins.len(),
                    origins
                );
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
                    .max_age(std::time::Duration::from_secs(3600))
            }
        }
        _ if config.is_production() => {
            tracing::warn!(
                "CORS_ORIGINS not configured in production mode. \
                 CORS requests will be rejected. Set CORS_ORIGINS to allow cross-origin requests."
            );
            CorsLayer::new()
        }
        _ => {
            tracing::warn!(
                "Using permissive CORS in development mode. \
                 Set CORS_ORIGINS for production-like behavior."
            );
            CorsLayer::permissive()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snapsong_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!(
        environment = %config.common.environment,
        "Starting Snapsong API server on port {}",
        config.port
    );

    let ollama = OllamaClient::new(config.ollama())?;
    tracing::info!(
        url = %config.ollama().url,
        model = %config.ollama().vision_model,
        "Ollama client initialized"
    );

    let spotify = SpotifyClient::new(config.spotify())?;
    tracing::info!("Spotify client initialized");

    let region = match config.catalog_region() {
        Some(key) => {
            let profile = taxonomy::region(key).ok_or_else(|| {
                anyhow::anyhow!("Unknown CATALOG_REGION '{}'", key)
            })?;
            tracing::info!(region = profile.key, "Regional catalog profile enabled");
            Some(profile)
        }
        None => None,
    };

    let vision = VisionService::new(Arc::new(ollama.clone()));
    let recommendations = RecommendationService::new(vision, Arc::new(spotify.clone()), region);

    let analyze_state = AnalyzeState::new(recommendations);
    let health_state = HealthState::new(HealthService::new(ollama, spotify));

    // Build the CORS layer from configuration
    let cors_layer = build_cors_layer(&config);

    let app = app_router(analyze_state, health_state, config.max_upload_bytes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
