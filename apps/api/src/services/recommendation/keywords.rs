//! Keyword extraction from vision model descriptions
//!
//! Turns free model text into an ordered, non-empty list of search
//! keywords. Strategies are tried in order and the first one that yields
//! anything wins:
//!
//! 1. The explicit `Music Keywords:` section
//! 2. Phrases synthesized from taxonomy terms found in the text
//! 3. The most frequent long alphabetic words
//! 4. A fixed generic list

use std::collections::HashMap;

use super::taxonomy::Category;

/// Section labels the describe prompt asks the model to emit
pub const DESCRIPTION_LABEL: &str = "Description";
pub const KEYWORDS_LABEL: &str = "Music Keywords";
pub const CAPTION_LABEL: &str = "Instagram Caption";

const SECTION_LABELS: [&str; 3] = [DESCRIPTION_LABEL, KEYWORDS_LABEL, CAPTION_LABEL];

/// Returned when nothing else can be extracted
pub const FALLBACK_KEYWORDS: [&str; 3] = ["Popular music", "Trending songs", "Recommended tracks"];

const QUOTE_CHARS: [char; 6] = ['"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

/// Minimum length (exclusive) of words considered by the lexical fallback
const LEXICAL_MIN_LEN: usize = 5;
const LEXICAL_TOP_N: usize = 3;

/// Which strategy produced a keyword list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordSource {
    Structured,
    Taxonomy,
    Lexical,
    Fallback,
}

/// Ordered search keywords; the first one is the primary keyword
#[derive(Debug, Clone, PartialEq)]
pub struct Keywords {
    list: Vec<String>,
    source: KeywordSource,
}

impl Keywords {
    fn new(list: Vec<String>, source: KeywordSource) -> Option<Self> {
        if list.is_empty() {
            None
        } else {
            Some(Self { list, source })
        }
    }

    fn fallback() -> Self {
        Self {
            list: FALLBACK_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            source: KeywordSource::Fallback,
        }
    }

    /// Keywords in priority order (never empty)
    pub fn as_slice(&self) -> &[String] {
        &self.list
    }

    pub fn primary(&self) -> &str {
        &self.list[0]
    }

    pub fn source(&self) -> KeywordSource {
        self.source
    }

    pub fn into_vec(self) -> Vec<String> {
        self.list
    }
}

/// Extract search keywords from a model description
///
/// Never fails and never returns an empty list.
pub fn extract_keywords(description: &str) -> Keywords {
    if let Some(keywords) = structured_keywords(description) {
        return keywords;
    }

    let caption = section(description, CAPTION_LABEL).unwrap_or_default();
    if let Some(keywords) = taxonomy_keywords(description, caption) {
        return keywords;
    }

    if let Some(keywords) = lexical_keywords(description) {
        return keywords;
    }

    tracing::debug!("No keywords recognised in description, using generic fallback");
    Keywords::fallback()
}

/// Body of a labelled section such as `**Music Keywords:** rock, jazz`
///
/// The label is matched case-insensitively, may be wrapped in `*`, and must
/// be followed by a colon. The body runs to the next `**` or to the next line
/// that starts with another known label. Empty bodies count as absent.
pub fn section<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    // ASCII lowercasing keeps byte offsets aligned with `text`
    let lower = text.to_ascii_lowercase();
    let needle = label.to_ascii_lowercase();

    let mut from = 0;
    while let Some(offset) = lower[from..].find(&needle) {
        let label_end = from + offset + needle.len();
        if let Some(body_start) = after_label_colon(&lower, label_end) {
            let body = &text[body_start..];
            let body = body[..section_end(body)].trim();
            return (!body.is_empty()).then_some(body);
        }
        from = label_end;
    }
    None
}

/// Offset just past `*:*` following a label, if present
fn after_label_colon(lower: &str, label_end: usize) -> Option<usize> {
    let rest = lower[label_end..].trim_start_matches('*');
    let rest = rest.strip_prefix(':')?.trim_start_matches('*');
    Some(lower.len() - rest.len())
}

fn section_end(body: &str) -> usize {
    let mut end = body.find("**").unwrap_or(body.len());

    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        if offset >= end {
            break;
        }
        if offset > 0 && starts_with_label(line) {
            end = offset;
            break;
        }
        offset += line.len();
    }
    end
}

fn starts_with_label(line: &str) -> bool {
    let lower = line
        .trim_start_matches(|c: char| c.is_whitespace() || c == '*' || c == '#')
        .to_ascii_lowercase();
    SECTION_LABELS.iter().any(|label| {
        let label = label.to_ascii_lowercase();
        lower
            .strip_prefix(&label)
            .map(|rest| rest.trim_start_matches('*').starts_with(':'))
            .unwrap_or(false)
    })
}

fn structured_keywords(description: &str) -> Option<Keywords> {
    let body = section(description, KEYWORDS_LABEL)?;
    let tokens = body
        .split(',')
        .map(|token| token.trim().trim_matches(&QUOTE_CHARS[..]).trim())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect();
    Keywords::new(tokens, KeywordSource::Structured)
}

fn taxonomy_keywords(description: &str, caption: &str) -> Option<Keywords> {
    let haystack = format!("{} {}", description, caption).to_lowercase();

    let found = Category::ALL.map(|category| {
        category
            .lowercase_terms()
            .iter()
            .filter(|(lower, _)| haystack.contains(lower.as_str()))
            .map(|(_, display)| *display)
            .collect::<Vec<_>>()
    });
    let [genres, moods, instruments, eras, locations] = &found;

    let mut phrases: Vec<String> = Vec::new();

    for genre in genres.iter().take(2) {
        phrases.push(format!("{} music", genre));
        if let Some(mood) = moods.first() {
            phrases.push(format!("{} {}", mood, genre));
        }
        if let Some(instrument) = instruments.first() {
            phrases.push(format!("{} {}", instrument, genre));
        }
    }

    for mood in moods.iter().take(2) {
        phrases.push(format!("{} music", mood));
    }

    for location in locations.iter().take(2) {
        phrases.push(format!("{} music", location));
        if let Some(genre) = genres.first() {
            phrases.push(format!("{} {}", location, genre));
        }
    }

    if let Some(era) = eras.first() {
        phrases.push(format!("{} music", era));
        if let Some(genre) = genres.first() {
            phrases.push(format!("{} {}", era, genre));
        }
    }

    if let Some(instrument) = instruments.first() {
        phrases.push(format!("{} music", instrument));
    }

    dedup_case_insensitive(&mut phrases);
    Keywords::new(phrases, KeywordSource::Taxonomy)
}

fn lexical_keywords(description: &str) -> Option<Keywords> {
    // word -> (count, first position)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, word) in description
        .split_whitespace()
        .filter(|w| w.chars().count() > LEXICAL_MIN_LEN && w.chars().all(char::is_alphabetic))
        .enumerate()
    {
        counts.entry(word).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));

    let keywords = ranked
        .into_iter()
        .take(LEXICAL_TOP_N)
        .map(|(word, _)| format!("{} music", word))
        .collect();
    Keywords::new(keywords, KeywordSource::Lexical)
}

fn dedup_case_insensitive(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.to_lowercase()));
}
