//! Health check service for the external collaborators
//!
//! Readiness depends on two services:
//! - Ollama, serving the configured vision model
//! - Spotify, accepting the configured client credentials

use serde::Serialize;
use snapsong_ollama_client::OllamaClient;
use snapsong_spotify_client::SpotifyClient;
use std::time::{Duration, Instant};

/// Status of an individual service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// Service is healthy and responding
    Healthy,
    /// Service is unhealthy or unreachable
    Unhealthy,
}

/// Result of a single service health check
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealth {
    /// Name of the service
    pub name: &'static str,
    /// Current status
    pub status: ServiceStatus,
    /// Response time in milliseconds (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    /// Error message if unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Additional details about the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ServiceHealth {
    /// Create a healthy service result
    pub fn healthy(name: &'static str, response_time: Duration) -> Self {
        Self {
            name,
            status: ServiceStatus::Healthy,
            response_time_ms: Some(response_time.as_millis() as u64),
            error: None,
            details: None,
        }
    }

    /// Create a healthy service result with details
    pub fn healthy_with_details(
        name: &'static str,
        response_time: Duration,
        details: serde_json::Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::healthy(name, response_time)
        }
    }

    /// Create an unhealthy service result
    pub fn unhealthy(name: &'static str, error: impl Into<String>) -> Self {
        Self {
            name,
            status: ServiceStatus::Unhealthy,
            response_time_ms: None,
            error: Some(error.into()),
            details: None,
        }
    }

    /// Create an unhealthy service result with response time
    pub fn unhealthy_with_time(
        name: &'static str,
        error: impl Into<String>,
        response_time: Duration,
    ) -> Self {
        Self {
            response_time_ms: Some(response_time.as_millis() as u64),
            ..Self::unhealthy(name, error)
        }
    }
}

/// Aggregated health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResponse {
    /// Overall status (healthy only if every service is healthy)
    pub status: ServiceStatus,
    /// Individual service health results
    pub services: Vec<ServiceHealth>,
    /// Total time to complete all health checks
    pub total_time_ms: u64,
    /// API version
    pub version: &'static str,
}

impl HealthCheckResponse {
    /// Create a new health check response from individual service results
    pub fn new(services: Vec<ServiceHealth>, total_time: Duration) -> Self {
        let status = if services.iter().all(|s| s.status == ServiceStatus::Healthy) {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Unhealthy
        };

        Self {
            status,
            services,
            total_time_ms: total_time.as_millis() as u64,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Check if overall health is good
    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}

/// Health check service for verifying external dependencies
pub struct HealthService {
    ollama: OllamaClient,
    spotify: SpotifyClient,
}

impl HealthService {
    /// Create a new health service over the clients the pipeline uses
    pub fn new(ollama: OllamaClient, spotify: SpotifyClient) -> Self {
        Self { ollama, spotify }
    }

    /// Check that Ollama responds and serves the configured vision model
    pub async fn check_ollama(&self) -> ServiceHealth {
        let start = Instant::now();
        let model = self.ollama.config().vision_model.as_str();

        match self.ollama.list_models().await {
            Ok(models) => {
                let elapsed = start.elapsed();
                let model_base = model.split(':').next().unwrap_or(model);
                let model_available = models
                    .iter()
                    .any(|m| m.split(':').next().unwrap_or(m) == model_base);

                let details = serde_json::json!({
                    "configured_model": model,
                    "model_available": model_available,
                    "available_models": models.len(),
                });

                if model_available {
                    ServiceHealth::healthy_with_details("ollama", elapsed, details)
                } else {
                    // The vision model is required; a reachable server without it is not ready
                    ServiceHealth {
                        details: Some(details),
                        ..ServiceHealth::unhealthy_with_time(
                            "ollama",
                            format!(
                                "Configured model '{}' not found. Available: {}",
                                model,
                                models.join(", ")
                            ),
                            elapsed,
                        )
                    }
                }
            }
            Err(e) => ServiceHealth::unhealthy_with_time(
                "ollama",
                format!("Request failed: {}", e),
                start.elapsed(),
            ),
        }
    }

    /// Check that Spotify accepts the configured client credentials
    pub async fn check_spotify(&self) -> ServiceHealth {
        let start = Instant::now();

        match self.spotify.validate_credentials().await {
            Ok(()) => ServiceHealth::healthy("spotify", start.elapsed()),
            Err(e) => ServiceHealth::unhealthy_with_time(
                "spotify",
                format!("Token request failed: {}", e),
                start.elapsed(),
            ),
        }
    }

    /// Run all health checks in parallel
    pub async fn check_all(&self) -> HealthCheckResponse {
        let start = Instant::now();

        let (ollama_health, spotify_health) =
            tokio::join!(self.check_ollama(), self.check_spotify());

        HealthCheckResponse::new(vec![ollama_health, spotify_health], start.elapsed())
    }
}
