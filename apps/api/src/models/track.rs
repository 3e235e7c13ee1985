//! Track candidate model
//!
//! A [`TrackCandidate`] is the canonical, provider-independent view of one
//! catalog track as it flows through aggregation and ranking and out onto
//! the wire.

use serde::{Deserialize, Serialize};

use crate::services::catalog::CatalogTrack;

/// Popularity assumed when the catalog omits it
pub const DEFAULT_POPULARITY: u32 = 50;

/// Placeholder for absent textual metadata
pub const UNKNOWN: &str = "Unknown";

/// One distinct catalog track, keyed by its provider identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackCandidate {
    /// Provider-assigned identifier (the only dedup key)
    pub id: String,
    pub name: String,
    /// Artist names joined for display
    pub artist: String,
    pub album: String,
    pub album_art: Option<String>,
    pub preview_url: Option<String>,
    pub spotify_url: Option<String>,
    /// Provider popularity, 0..=100
    pub popularity: u32,
    /// Why this track was selected
    pub match_type: Option<String>,
    /// Blend of discovery position and popularity, 0..=100
    pub relevance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
}

impl TrackCandidate {
    /// Build a candidate from a raw catalog record
    ///
    /// Returns `None` for records without an identifier since they cannot
    /// be deduplicated.
    pub fn from_catalog(track: &CatalogTrack, match_type: Option<&str>) -> Option<Self> {
        let id = track.id.as_deref().map(str::trim).filter(|id| !id.is_empty())?;

        let artist = track.artist_names();
        let album = track.album.as_ref();

        Some(Self {
            id: id.to_string(),
            name: non_blank(track.name.as_deref()),
            artist: non_blank(Some(artist.as_str())),
            album: non_blank(album.and_then(|a| a.name.as_deref())),
            album_art: track.album_art().map(str::to_string),
            preview_url: track.preview_url.clone(),
            spotify_url: track.spotify_url().map(str::to_string),
            popularity: track
                .popularity
                .unwrap_or(DEFAULT_POPULARITY)
                .min(100),
            match_type: match_type.map(str::to_string),
            relevance: 0.0,
            release_date: album.and_then(|a| a.release_date.clone()),
        })
    }

    /// Haystack used by acceptance predicates: name, artist and album, lowercased
    pub fn searchable_text(&self) -> String {
        format!("{} {} {}", self.name, self.artist, self.album).to_lowercase()
    }
}

fn non_blank(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN.to_string(),
    }
}
