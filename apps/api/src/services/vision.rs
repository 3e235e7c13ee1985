//! Vision model service
//!
//! Wraps the multimodal model behind [`VisionModel`] and turns its untrusted
//! output into a description string and [`ImageAttributes`]. Every failure
//! here degrades to a documented default instead of failing the request.

use std::io::Cursor;
use std::sync::Arc;

use axum::async_trait;
use image::{DynamicImage, ImageFormat};
use serde::Deserialize;
use snapsong_ollama_client::{OllamaClient, OllamaResult, ResponseFormat};
use tracing::{debug, warn};

use crate::models::analysis::{NEUTRAL_ATTRIBUTE, UNKNOWN_ATTRIBUTE};
use crate::models::ImageAttributes;

/// Substituted when the model cannot describe the image
pub const DESCRIBE_FALLBACK: &str =
    "Could not describe the image. Please try again with a different image.";

/// Images larger than this on either side are downscaled before upload
pub const MAX_IMAGE_DIMENSION: u32 = 1024;

const DESCRIBE_PROMPT: &str = "\
Look at this image and answer in exactly three labelled sections.

**Description:** two or three sentences about what the image shows and the feeling it gives.

**Music Keywords:** 5 to 7 comma-separated keywords for finding songs that fit this image. \
Cover genre, mood, culture or region, instruments and era where they apply.

**Instagram Caption:** one short caption for posting this image.";

const ATTRIBUTES_PROMPT: &str = "\
Analyze this image and reply with a single JSON object with these keys:
\"scene\" (one or two words, e.g. beach, city, forest, concert),
\"mood\" (one word, e.g. calm, happy, romantic, energetic),
\"emotion\" (one word, e.g. joy, peace, nostalgia, love),
\"dominant_color\" (one word),
\"time_of_day\" (optional, e.g. sunrise, night),
\"characteristics\" (optional list of up to three short visual traits).
Reply with the JSON object only.";

/// Multimodal model that can answer a prompt about one image
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        image: &[u8],
        format: Option<ResponseFormat>,
    ) -> OllamaResult<String>;
}

#[async_trait]
impl VisionModel for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        image: &[u8],
        format: Option<ResponseFormat>,
    ) -> OllamaResult<String> {
        self.generate_with_images(prompt, &[image.to_vec()], format)
            .await
    }
}

/// Describes images and extracts their visual attributes
#[derive(Clone)]
pub struct VisionService {
    model: Arc<dyn VisionModel>,
}

impl VisionService {
    pub fn new(model: Arc<dyn VisionModel>) -> Self {
        Self { model }
    }

    /// Sectioned free-text description, or [`DESCRIBE_FALLBACK`]
    pub async fn describe(&self, image: &[u8]) -> String {
        match self.model.generate(DESCRIBE_PROMPT, image, None).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("Vision model returned an empty description");
                DESCRIBE_FALLBACK.to_string()
            }
            Err(e) => {
                warn!(error = %e, "Image description failed, using fallback text");
                DESCRIBE_FALLBACK.to_string()
            }
        }
    }

    /// Scene, mood, emotion and color of the image (defaults on failure)
    pub async fn attributes(&self, image: &[u8]) -> ImageAttributes {
        match self
            .model
            .generate(ATTRIBUTES_PROMPT, image, Some(ResponseFormat::Json))
            .await
        {
            Ok(text) => parse_attributes(&text),
            Err(e) => {
                warn!(error = %e, "Attribute analysis failed, using defaults");
                ImageAttributes::default()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawAttributes {
    scene: Option<String>,
    mood: Option<String>,
    emotion: Option<String>,
    #[serde(alias = "color")]
    dominant_color: Option<String>,
    time_of_day: Option<String>,
    #[serde(default)]
    characteristics: Vec<String>,
}

/// Parse the attribute reply of the vision model
///
/// Tries the outermost `{...}` span as JSON first, then scrapes `key: value`
/// lines. Anything that cannot be recovered keeps its default.
pub fn parse_attributes(text: &str) -> ImageAttributes {
    if let Some(json) = outer_object(text) {
        match serde_json::from_str::<RawAttributes>(json) {
            Ok(raw) => return from_raw(raw),
            Err(e) => debug!(error = %e, "Attribute JSON malformed, scraping lines"),
        }
    }
    scrape_lines(text)
}

fn outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn from_raw(raw: RawAttributes) -> ImageAttributes {
    ImageAttributes {
        scene: or_default(raw.scene, UNKNOWN_ATTRIBUTE),
        mood: or_default(raw.mood, NEUTRAL_ATTRIBUTE),
        emotion: or_default(raw.emotion, NEUTRAL_ATTRIBUTE),
        dominant_color: or_default(raw.dominant_color, UNKNOWN_ATTRIBUTE),
        time_of_day: raw.time_of_day.and_then(non_empty),
        characteristics: raw
            .characteristics
            .into_iter()
            .filter_map(non_empty)
            .collect(),
    }
}

fn scrape_lines(text: &str) -> ImageAttributes {
    ImageAttributes {
        scene: or_default(scraped_value(text, "scene"), UNKNOWN_ATTRIBUTE),
        mood: or_default(scraped_value(text, "mood"), NEUTRAL_ATTRIBUTE),
        emotion: or_default(scraped_value(text, "emotion"), NEUTRAL_ATTRIBUTE),
        dominant_color: or_default(scraped_value(text, "color"), UNKNOWN_ATTRIBUTE),
        ..ImageAttributes::default()
    }
}

/// Value after the first `:` on the first line mentioning `key`
fn scraped_value(text: &str, key: &str) -> Option<String> {
    let line = text
        .lines()
        .find(|line| line.to_ascii_lowercase().contains(key))?;
    let (_, value) = line.split_once(':')?;
    let value = value
        .trim()
        .trim_end_matches(',')
        .trim()
        .trim_matches(|c| c == '"' || c == '\'');
    Some(value.to_string())
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .and_then(non_empty)
        .unwrap_or_else(|| default.to_string())
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Downscale and re-encode an upload as JPEG for the vision model
///
/// Input that cannot be decoded is returned unchanged and left for the
/// model to reject.
pub fn normalize_image(bytes: Vec<u8>) -> Vec<u8> {
    let decoded = match image::load_from_memory(&bytes) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(error = %e, size = bytes.len(), "Could not decode upload, sending as-is");
            return bytes;
        }
    };

    let resized = if decoded.width() > MAX_IMAGE_DIMENSION || decoded.height() > MAX_IMAGE_DIMENSION
    {
        decoded.thumbnail(MAX_IMAGE_DIMENSION, MAX_IMAGE_DIMENSION)
    } else {
        decoded
    };

    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
    let mut encoded = Cursor::new(Vec::new());
    match rgb.write_to(&mut encoded, ImageFormat::Jpeg) {
        Ok(()) => {
            debug!(
                original = bytes.len(),
                normalized = encoded.get_ref().len(),
                width = rgb.width(),
                height = rgb.height(),
                "Image normalized"
            );
            encoded.into_inner()
        }
        Err(e) => {
            warn!(error = %e, "JPEG re-encode failed, sending original upload");
            bytes
        }
    }
}
