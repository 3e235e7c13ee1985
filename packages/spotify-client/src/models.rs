//! Spotify Web API response models
//!
//! Every catalog field is optional: search results regularly omit previews,
//! artwork and popularity, and a missing field must never fail the parse.

use serde::{Deserialize, Serialize};

/// A track from the Spotify catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Track {
    /// Spotify track ID
    #[serde(default)]
    pub id: Option<String>,
    /// Track title
    #[serde(default)]
    pub name: Option<String>,
    /// Credited artists, in billing order
    #[serde(default)]
    pub artists: Vec<Artist>,
    /// Album the track appears on
    #[serde(default)]
    pub album: Option<Album>,
    /// 30 second preview clip
    #[serde(default)]
    pub preview_url: Option<String>,
    /// Public links
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
    /// Popularity score (0 - 100)
    #[serde(default)]
    pub popularity: Option<u32>,
}

impl Track {
    /// Artist names joined with ", "
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .filter_map(|a| a.name.as_deref())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// URL of the first (largest) album image
    pub fn album_art(&self) -> Option<&str> {
        self.album
            .as_ref()
            .and_then(|a| a.images.first())
            .map(|image| image.url.as_str())
    }

    /// Public Spotify page for the track
    pub fn spotify_url(&self) -> Option<&str> {
        self.external_urls
            .as_ref()
            .and_then(|urls| urls.spotify.as_deref())
    }
}

/// A credited artist
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Album summary embedded in a track
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Album {
    #[serde(default)]
    pub name: Option<String>,
    /// Cover art, largest first
    #[serde(default)]
    pub images: Vec<Image>,
    /// Release date with variable precision ("1999", "1999-03", "1999-03-21")
    #[serde(default)]
    pub release_date: Option<String>,
}

/// Cover art image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

/// Public links for a catalog object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

// Internal response types for deserialization

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrackPage {
    // Spotify occasionally returns null entries in search pages
    #[serde(default)]
    pub items: Vec<Option<Track>>,
}

impl SearchResponse {
    pub(crate) fn into_tracks(self) -> Vec<Track> {
        self.tracks
            .map(|page| page.items.into_iter().flatten().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Web API error envelope: `{"error": {"status": 400, "message": "..."}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

/// Accounts service error: `{"error": "invalid_client", "error_description": "..."}`
#[derive(Debug, Deserialize)]
pub(crate) struct AuthErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}
