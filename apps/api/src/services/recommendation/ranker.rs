//! Relevance scoring and final ordering

use std::collections::HashMap;

use super::context::QueryContext;
use super::RankingMode;
use crate::models::TrackCandidate;

const POSITION_WEIGHT: f64 = 0.7;
const POPULARITY_WEIGHT: f64 = 0.3;
const POSITION_STEP: f64 = 10.0;
const MAX_RELEVANCE: f64 = 100.0;

/// Enhanced ranking applies diversity only above this many candidates
const DIVERSITY_MIN_CANDIDATES: usize = 10;
const PER_MATCH_TYPE: usize = 3;

const RELATED_LABEL: &str = "related";

/// Relevance for a candidate discovered at `position` (0-based)
///
/// Rounded to one decimal place.
pub fn relevance(position: usize, popularity: u32) -> f64 {
    let position_score = (MAX_RELEVANCE - position as f64 * POSITION_STEP).max(0.0);
    let score = position_score * POSITION_WEIGHT + f64::from(popularity.min(100)) * POPULARITY_WEIGHT;
    (score.min(MAX_RELEVANCE) * 10.0).round() / 10.0
}

/// Score, label and order aggregated candidates
///
/// The input is left untouched and the output is a pure function of it, so
/// ranking the same aggregate twice gives the same list.
pub fn rank(
    candidates: &[TrackCandidate],
    keywords: &[String],
    context: Option<&QueryContext>,
    mode: RankingMode,
) -> Vec<TrackCandidate> {
    let mood = context.and_then(|c| c.mood.as_deref());
    let emotion = context.and_then(|c| c.emotion.as_deref());

    let mut ranked: Vec<TrackCandidate> = candidates
        .iter()
        .enumerate()
        .map(|(position, candidate)| {
            let mut candidate = candidate.clone();
            candidate.relevance = relevance(position, candidate.popularity);
            if candidate.match_type.is_none() {
                candidate.match_type = Some(fallback_match_type(position, keywords, mood, emotion));
            }
            candidate
        })
        .collect();

    match mode {
        RankingMode::Basic => {
            ranked.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        }
        RankingMode::Enhanced => {
            ranked.sort_by(|a, b| b.popularity.cmp(&a.popularity));
            if ranked.len() > DIVERSITY_MIN_CANDIDATES {
                ranked = diversify(ranked);
            }
        }
    }

    ranked.truncate(mode.output_bound());
    ranked
}

fn fallback_match_type(
    position: usize,
    keywords: &[String],
    mood: Option<&str>,
    emotion: Option<&str>,
) -> String {
    if let Some(keyword) = keywords.get(position) {
        return keyword.clone();
    }
    let attribute = if position % 2 == 0 { mood } else { emotion };
    attribute.unwrap_or(RELATED_LABEL).to_string()
}

/// Up to three of each match type first, then the rest by popularity
///
/// Expects `ranked` already sorted by popularity, descending.
fn diversify(ranked: Vec<TrackCandidate>) -> Vec<TrackCandidate> {
    let mut group_order: Vec<Option<String>> = Vec::new();
    let mut groups: HashMap<Option<String>, Vec<TrackCandidate>> = HashMap::new();

    for candidate in ranked {
        let key = candidate.match_type.clone();
        if !groups.contains_key(&key) {
            group_order.push(key.clone());
        }
        groups.entry(key).or_default().push(candidate);
    }

    let mut diverse = Vec::new();
    let mut remaining = Vec::new();
    for key in group_order {
        if let Some(mut group) = groups.remove(&key) {
            let rest = group.split_off(group.len().min(PER_MATCH_TYPE));
            diverse.extend(group);
            remaining.extend(rest);
        }
    }

    remaining.sort_by(|a, b| b.popularity.cmp(&a.popularity));
    diverse.extend(remaining);
    diverse
}
