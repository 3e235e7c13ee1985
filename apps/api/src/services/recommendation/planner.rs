//! Search query planning
//!
//! Builds the ordered list of catalog queries for one analysis. Earlier
//! queries have priority: their results win on duplicate tracks and they
//! fetch more results per call.

use std::collections::HashSet;

use super::context::{mood_terms, QueryContext};
use super::taxonomy::RegionProfile;
use super::RankingMode;

/// Upper bound on queries issued per analysis, follow-up queries included
pub const MAX_QUERIES: usize = 15;

/// Upper bound on a single query's length, in characters
pub const MAX_QUERY_CHARS: usize = 100;

/// Number of leading keywords joined into the supplemental query
const COMBINED_KEYWORDS: usize = 3;

/// Enhanced mode fetches more for the first few queries
const PRIORITY_QUERIES: usize = 2;
const PRIORITY_LIMIT: u32 = 10;
const DEFAULT_LIMIT: u32 = 5;
const BASIC_LIMIT: u32 = 10;
const LAST_RESORT_LIMIT: u32 = 15;

const FALLBACK_QUERIES: [&str; 3] = ["popular", "trending", "top hits"];
const LAST_RESORT_QUERY: &str = "popular";

pub const COMBINED_LABEL: &str = "Combined";
pub const POPULAR_LABEL: &str = "Popular";
const SCENE_LABEL: &str = "Scene Match";
const TEMPO_LABEL: &str = "Tempo Match";

/// A catalog query with the label its results are tagged with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedQuery {
    pub text: String,
    pub label: String,
    pub limit: u32,
    /// The query named the region before any regional prefix was added
    pub names_region: bool,
}

impl PlannedQuery {
    pub fn new(text: impl Into<String>, label: impl Into<String>, limit: u32) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
            limit,
            names_region: false,
        }
    }
}

/// Ordered queries for one analysis
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Primary queries, in priority order (never empty)
    pub queries: Vec<PlannedQuery>,
    /// Combined keyword query, issued only when the primary queries come up short
    pub supplemental: Option<PlannedQuery>,
    /// Issued only when nothing at all was found
    pub last_resort: PlannedQuery,
}

impl QueryPlan {
    /// Most catalog calls this plan can cause
    pub fn max_issued(&self) -> usize {
        self.queries.len() + usize::from(self.supplemental.is_some()) + 1
    }
}

/// Plans catalog queries, optionally biased towards one regional catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryPlanner {
    region: Option<&'static RegionProfile>,
}

impl QueryPlanner {
    pub fn new(region: Option<&'static RegionProfile>) -> Self {
        Self { region }
    }

    pub fn region(&self) -> Option<&'static RegionProfile> {
        self.region
    }

    /// Build the query plan for a keyword list and optional attribute context
    ///
    /// Contextual queries are only planned in enhanced mode.
    pub fn plan(
        &self,
        keywords: &[String],
        context: Option<&QueryContext>,
        mode: RankingMode,
    ) -> QueryPlan {
        let mut raw: Vec<(String, String)> = keywords
            .iter()
            .map(|keyword| (keyword.clone(), keyword.clone()))
            .collect();

        if mode == RankingMode::Enhanced {
            if let Some(context) = context.filter(|c| c.has_attributes()) {
                raw.extend(contextual_queries(context));
            }
        }

        if let Some(region) = self.region {
            if let Some(context) = context {
                raw.extend(regional_mood_queries(context));
            }
            raw.extend(
                region
                    .staple_queries
                    .iter()
                    .map(|q| (q.to_string(), region.staple_label.to_string())),
            );
        }

        if raw.is_empty() {
            raw = FALLBACK_QUERIES
                .iter()
                .map(|q| (q.to_string(), POPULAR_LABEL.to_string()))
                .collect();
        }

        let supplemental = (keywords.len() > 1)
            .then(|| {
                let combined = keywords
                    .iter()
                    .take(COMBINED_KEYWORDS)
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" ");
                self.query(&combined, COMBINED_LABEL, limit_for(mode, 0))
            })
            .flatten();

        let last_resort = self
            .query(LAST_RESORT_QUERY, POPULAR_LABEL, LAST_RESORT_LIMIT)
            .unwrap_or_else(|| PlannedQuery::new(LAST_RESORT_QUERY, POPULAR_LABEL, LAST_RESORT_LIMIT));

        // the follow-up queries share the same budget
        let primary_budget = MAX_QUERIES - 1 - usize::from(supplemental.is_some());

        let mut seen = HashSet::new();
        let queries: Vec<PlannedQuery> = raw
            .into_iter()
            .filter_map(|(text, label)| {
                let query = self.query(&text, label, 0)?;
                seen.insert(query.text.to_lowercase()).then_some(query)
            })
            .take(primary_budget)
            .enumerate()
            .map(|(index, query)| PlannedQuery {
                limit: limit_for(mode, index),
                ..query
            })
            .collect();

        QueryPlan {
            queries,
            supplemental,
            last_resort,
        }
    }

    /// Build a normalized query, remembering whether the raw text named the region
    fn query(&self, text: &str, label: impl Into<String>, limit: u32) -> Option<PlannedQuery> {
        let names_region = self.region.is_some_and(|region| {
            let lower = text.to_lowercase();
            region.indicators.iter().any(|i| lower.contains(i))
        });
        let text = self.normalize(text)?;

        Some(PlannedQuery {
            names_region,
            ..PlannedQuery::new(text, label, limit)
        })
    }

    /// Trim, regionalize and bound a query; blank queries are dropped
    fn normalize(&self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let text = match self.region {
            Some(region) if !text.to_lowercase().contains(&region.term.to_lowercase()) => {
                format!("{} {}", region.term, text)
            }
            _ => text.to_string(),
        };

        Some(truncate_chars(&text, MAX_QUERY_CHARS).trim_end().to_string())
    }
}

fn limit_for(mode: RankingMode, index: usize) -> u32 {
    match mode {
        RankingMode::Basic => BASIC_LIMIT,
        RankingMode::Enhanced if index < PRIORITY_QUERIES => PRIORITY_LIMIT,
        RankingMode::Enhanced => DEFAULT_LIMIT,
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// "calm" -> "Calm", "LO-FI" -> "Lo-fi"
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn contextual_queries(context: &QueryContext) -> Vec<(String, String)> {
    let mut queries = Vec::new();
    let mood = context.mood.as_deref();

    match (mood, context.emotion.as_deref()) {
        (Some(mood), Some(emotion)) => queries.push((
            format!("{} {}", mood, emotion),
            format!("{} {}", capitalize(mood), capitalize(emotion)),
        )),
        (Some(mood), None) => {
            queries.push((mood.to_string(), format!("{} Mood", capitalize(mood))))
        }
        (None, Some(emotion)) => queries.push((
            emotion.to_string(),
            format!("{} Emotion", capitalize(emotion)),
        )),
        (None, None) => {}
    }

    if let Some(scene) = context.scene.as_deref() {
        queries.push((scene.to_string(), SCENE_LABEL.to_string()));
        if let Some(mood) = mood {
            queries.push((format!("{} {}", scene, mood), SCENE_LABEL.to_string()));
        }
    }

    for genre in context.genre_hints.iter().take(3) {
        let label = format!("{} Genre", capitalize(genre));
        queries.push((genre.clone(), label.clone()));
        if let Some(mood) = mood {
            queries.push((format!("{} {}", genre, mood), label));
        }
    }

    queries.push((
        format!("{} {}", context.tempo, context.energy),
        TEMPO_LABEL.to_string(),
    ));

    if let Some(time_of_day) = context.time_of_day.as_deref() {
        queries.push((time_of_day.to_string(), SCENE_LABEL.to_string()));
        if let Some(mood) = mood {
            queries.push((format!("{} {}", time_of_day, mood), SCENE_LABEL.to_string()));
        }
    }

    for characteristic in context.characteristics.iter().take(2) {
        queries.push((characteristic.clone(), SCENE_LABEL.to_string()));
    }

    queries
}

/// Mood and emotion expanded through the regional mood vocabulary
fn regional_mood_queries(context: &QueryContext) -> Vec<(String, String)> {
    context
        .mood
        .iter()
        .chain(context.emotion.iter())
        .flat_map(|value| mood_terms(value))
        .map(|term| {
            let label = format!("{} Mood", capitalize(&term));
            (term, label)
        })
        .collect()
}
