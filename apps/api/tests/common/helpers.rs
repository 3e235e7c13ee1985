//! Test helper functions for API integration tests
//!
//! Builds routers over in-memory collaborators and multipart upload
//! requests, and decodes JSON responses.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use snapsong_api::routes::{analyze_router, AnalyzeState};
use snapsong_api::services::{CatalogSearch, RecommendationService, VisionModel, VisionService};
use std::sync::Arc;

pub const BOUNDARY: &str = "snapsong-test-boundary";

/// Analysis router over the given vision model and catalog
pub fn analyze_app(
    vision: impl VisionModel + 'static,
    catalog: Arc<dyn CatalogSearch>,
) -> Router {
    let service = RecommendationService::new(VisionService::new(Arc::new(vision)), catalog, None);
    analyze_router(AnalyzeState::new(service))
}

/// Multipart body with a single field
///
/// `file_name: None` sends a plain form field rather than a file.
pub fn multipart_body(field: &str, file_name: Option<&str>, content: &[u8]) -> Vec<u8> {
    let disposition = match file_name {
        Some(name) => format!("form-data; name=\"{}\"; filename=\"{}\"", field, name),
        None => format!("form-data; name=\"{}\"", field),
    };

    let mut body = format!(
        "--{}\r\nContent-Disposition: {}\r\nContent-Type: application/octet-stream\r\n\r\n",
        BOUNDARY, disposition
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// POST a multipart body to `uri`
pub fn upload_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// POST `content` as the `image` file field
pub fn image_upload(uri: &str, content: &[u8]) -> Request<Body> {
    upload_request(uri, multipart_body("image", Some("photo.png"), content))
}

/// Decode a JSON response body
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
