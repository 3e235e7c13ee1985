//! Test fixtures for API integration tests
//!
//! In-memory stand-ins for the vision model and the music catalog, plus
//! canned model output.

#![allow(dead_code)]

use axum::async_trait;
use snapsong_api::services::{CatalogError, CatalogResult, CatalogSearch, CatalogTrack, VisionModel};
use snapsong_ollama_client::{OllamaError, OllamaResult, ResponseFormat};
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::Mutex;

/// Model output with all three labelled sections
pub const BEACH_DESCRIPTION: &str = "**Description:** Waves rolling onto an empty beach at sunset.\n\
**Music Keywords:** Reggae, Calm, Acoustic guitar\n\
**Instagram Caption:** Salt in the air";

pub const BEACH_ATTRIBUTES: &str =
    r#"{"scene": "beach", "mood": "calm", "emotion": "peace", "dominant_color": "orange"}"#;

/// Vision model with fixed replies for the describe and attribute prompts
///
/// A `None` reply makes that prompt fail.
pub struct ScriptedVision {
    pub description: Option<String>,
    pub attributes: Option<String>,
}

impl ScriptedVision {
    pub fn new(description: &str, attributes: &str) -> Self {
        Self {
            description: Some(description.to_string()),
            attributes: Some(attributes.to_string()),
        }
    }

    pub fn offline() -> Self {
        Self {
            description: None,
            attributes: None,
        }
    }

    pub fn beach() -> Self {
        Self::new(BEACH_DESCRIPTION, BEACH_ATTRIBUTES)
    }
}

#[async_trait]
impl VisionModel for ScriptedVision {
    async fn generate(
        &self,
        _prompt: &str,
        _image: &[u8],
        format: Option<ResponseFormat>,
    ) -> OllamaResult<String> {
        let reply = match format {
            Some(ResponseFormat::Json) => &self.attributes,
            None => &self.description,
        };
        reply
            .clone()
            .ok_or_else(|| OllamaError::ConnectionRefused("http://localhost:11434".to_string()))
    }
}

/// Catalog answering from a fixed query table
///
/// Unknown queries return no tracks; queries in `failing` return an error.
/// Every query received is recorded in order.
#[derive(Default)]
pub struct TableCatalog {
    results: HashMap<String, Vec<CatalogTrack>>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl TableCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, query: &str, tracks: Vec<CatalogTrack>) -> Self {
        self.results.insert(query.to_string(), tracks);
        self
    }

    pub fn failing(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogSearch for TableCatalog {
    async fn search_tracks(&self, query: &str, _limit: u32) -> CatalogResult<Vec<CatalogTrack>> {
        self.calls.lock().unwrap().push(query.to_string());
        if self.failing.contains(query) {
            return Err(CatalogError::Unavailable(format!("query '{}' failed", query)));
        }
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }
}

/// Catalog track with an id, a derived name and a popularity
pub fn track(id: &str, popularity: u32) -> CatalogTrack {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": format!("Song {}", id),
        "artists": [{"name": format!("Artist {}", id)}],
        "album": {
            "name": format!("Album {}", id),
            "images": [{"url": format!("https://img.example/{}.jpg", id)}],
            "release_date": "2021-06-01"
        },
        "preview_url": null,
        "external_urls": {"spotify": format!("https://open.spotify.com/track/{}", id)},
        "popularity": popularity
    }))
    .unwrap()
}

/// A small valid PNG
/// Catalog track credited to a specific artist
pub fn track_by(id: &str, artist: &str, popularity: u32) -> CatalogTrack {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": format!("Song {}", id),
        "artists": [{"name": artist}],
        "album": {"name": format!("Album {}", id)},
        "popularity": popularity
    }))
    .unwrap()
}

pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(16, 16, image::Rgb([30, 144, 255]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
