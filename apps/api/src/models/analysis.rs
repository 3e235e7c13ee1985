//! Image analysis models

use serde::{Deserialize, Serialize};

use super::TrackCandidate;

/// Attribute fallback for scene and dominant color
pub const UNKNOWN_ATTRIBUTE: &str = "Unknown";

/// Attribute fallback for mood and emotion
pub const NEUTRAL_ATTRIBUTE: &str = "Neutral";

/// Visual attributes extracted from an image by the vision model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAttributes {
    pub scene: String,
    pub mood: String,
    pub emotion: String,
    pub dominant_color: String,
    /// Optional hint such as "sunset" or "night"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<String>,
    /// Free-form visual characteristics ("misty", "crowded")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub characteristics: Vec<String>,
}

impl Default for ImageAttributes {
    fn default() -> Self {
        Self {
            scene: UNKNOWN_ATTRIBUTE.to_string(),
            mood: NEUTRAL_ATTRIBUTE.to_string(),
            emotion: NEUTRAL_ATTRIBUTE.to_string(),
            dominant_color: UNKNOWN_ATTRIBUTE.to_string(),
            time_of_day: None,
            characteristics: Vec::new(),
        }
    }
}

/// Response body for the analyze endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub image_description: String,
    pub image_keywords: Vec<String>,
    pub primary_keyword: String,
    pub instagram_caption: String,
    pub spotify_tracks: Vec<TrackCandidate>,
    pub scene: String,
    pub mood: String,
    pub emotion: String,
    pub dominant_color: String,
}
