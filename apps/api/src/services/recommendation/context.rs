//! Query context derived from image attributes

use std::fmt;

use super::taxonomy::{
    DEFAULT_MOOD_GENRES, DEFAULT_SCENE_GENRES, EMOTION_MOOD_TERMS, FAST_TEMPO_EMOTIONS,
    FAST_TEMPO_MOODS, HIGH_ENERGY_EMOTIONS, HIGH_ENERGY_MOODS, LOW_ENERGY_EMOTIONS,
    LOW_ENERGY_MOODS, MOOD_GENRES, SCENE_GENRES, SLOW_TEMPO_EMOTIONS, SLOW_TEMPO_MOODS,
};
use crate::models::analysis::{NEUTRAL_ATTRIBUTE, UNKNOWN_ATTRIBUTE};
use crate::models::ImageAttributes;

const MAX_GENRE_HINTS: usize = 5;
const MIN_GENRE_HINTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Energy {
    High,
    Medium,
    Low,
}

impl Energy {
    pub fn as_str(self) -> &'static str {
        match self {
            Energy::High => "high",
            Energy::Medium => "medium",
            Energy::Low => "low",
        }
    }
}

impl fmt::Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tempo {
    Fast,
    Moderate,
    Slow,
}

impl Tempo {
    pub fn as_str(self) -> &'static str {
        match self {
            Tempo::Fast => "fast",
            Tempo::Moderate => "moderate",
            Tempo::Slow => "slow",
        }
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute context used to plan contextual queries
///
/// Attribute values equal to the parse defaults (`Unknown`, `Neutral`) are
/// treated as absent.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryContext {
    pub mood: Option<String>,
    pub emotion: Option<String>,
    pub scene: Option<String>,
    pub time_of_day: Option<String>,
    pub genre_hints: Vec<String>,
    pub energy: Energy,
    pub tempo: Tempo,
    pub characteristics: Vec<String>,
}

impl QueryContext {
    pub fn from_attributes(attributes: &ImageAttributes) -> Self {
        let mood = meaningful(&attributes.mood);
        let emotion = meaningful(&attributes.emotion);
        let scene = meaningful(&attributes.scene);

        let mood_key = mood.as_deref().unwrap_or_default().to_lowercase();
        let emotion_key = emotion.as_deref().unwrap_or_default().to_lowercase();
        let scene_key = scene.as_deref().unwrap_or_default().to_lowercase();

        Self {
            genre_hints: genre_hints(&scene_key, &mood_key),
            energy: energy_level(&mood_key, &emotion_key),
            tempo: tempo(&mood_key, &emotion_key),
            time_of_day: attributes.time_of_day.as_deref().and_then(meaningful),
            characteristics: attributes
                .characteristics
                .iter()
                .filter_map(|c| meaningful(c))
                .collect(),
            mood,
            emotion,
            scene,
        }
    }

    /// Whether any attribute beyond the derived defaults is present
    pub fn has_attributes(&self) -> bool {
        self.mood.is_some()
            || self.emotion.is_some()
            || self.scene.is_some()
            || self.time_of_day.is_some()
            || !self.characteristics.is_empty()
    }
}

fn meaningful(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty()
        || value.eq_ignore_ascii_case(UNKNOWN_ATTRIBUTE)
        || value.eq_ignore_ascii_case(NEUTRAL_ATTRIBUTE)
    {
        None
    } else {
        Some(value.to_string())
    }
}

/// Genres suggested by a scene and mood pair (lowercase keys)
///
/// Genres common to both tables come first, then the rest of the scene
/// genres, then the rest of the mood genres. At most five, at least three.
pub fn genre_hints(scene: &str, mood: &str) -> Vec<String> {
    let scene_genres = SCENE_GENRES
        .get(scene)
        .copied()
        .unwrap_or(DEFAULT_SCENE_GENRES);
    let mood_genres = MOOD_GENRES.get(mood).copied().unwrap_or(DEFAULT_MOOD_GENRES);

    let mut hints: Vec<&str> = scene_genres
        .iter()
        .filter(|g| mood_genres.contains(*g))
        .copied()
        .collect();

    for genre in scene_genres.iter().chain(mood_genres.iter()) {
        if hints.len() >= MAX_GENRE_HINTS {
            break;
        }
        if !hints.contains(genre) {
            hints.push(*genre);
        }
    }

    for genre in DEFAULT_SCENE_GENRES {
        if hints.len() >= MIN_GENRE_HINTS {
            break;
        }
        if !hints.contains(genre) {
            hints.push(*genre);
        }
    }

    hints.truncate(MAX_GENRE_HINTS);
    hints.into_iter().map(str::to_string).collect()
}

fn indicator_balance(
    mood: &str,
    emotion: &str,
    up: (&[&str], &[&str]),
    down: (&[&str], &[&str]),
) -> std::cmp::Ordering {
    let up_count = usize::from(up.0.contains(&mood)) + usize::from(up.1.contains(&emotion));
    let down_count = usize::from(down.0.contains(&mood)) + usize::from(down.1.contains(&emotion));
    up_count.cmp(&down_count)
}

pub fn energy_level(mood: &str, emotion: &str) -> Energy {
    match indicator_balance(
        mood,
        emotion,
        (HIGH_ENERGY_MOODS, HIGH_ENERGY_EMOTIONS),
        (LOW_ENERGY_MOODS, LOW_ENERGY_EMOTIONS),
    ) {
        std::cmp::Ordering::Greater => Energy::High,
        std::cmp::Ordering::Less => Energy::Low,
        std::cmp::Ordering::Equal => Energy::Medium,
    }
}

pub fn tempo(mood: &str, emotion: &str) -> Tempo {
    match indicator_balance(
        mood,
        emotion,
        (FAST_TEMPO_MOODS, FAST_TEMPO_EMOTIONS),
        (SLOW_TEMPO_MOODS, SLOW_TEMPO_EMOTIONS),
    ) {
        std::cmp::Ordering::Greater => Tempo::Fast,
        std::cmp::Ordering::Less => Tempo::Slow,
        std::cmp::Ordering::Equal => Tempo::Moderate,
    }
}

/// Searchable mood terms for an emotion or mood, falling back to the value itself
pub fn mood_terms(value: &str) -> Vec<String> {
    let key = value.trim().to_lowercase();
    match EMOTION_MOOD_TERMS.get(key.as_str()) {
        Some(terms) => terms.iter().map(|t| t.to_string()).collect(),
        None => vec![key],
    }
}
