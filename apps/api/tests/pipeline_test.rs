//! Integration tests for the recommendation pipeline
//!
//! Exercises keyword extraction, planning, aggregation and ranking together
//! over an in-memory catalog.

mod common;

use common::*;
use rstest::rstest;
use snapsong_api::models::ImageAttributes;
use snapsong_api::services::recommendation::context::QueryContext;
use snapsong_api::services::recommendation::keywords::{extract_keywords, KeywordSource};
use snapsong_api::services::recommendation::ranker;
use snapsong_api::services::recommendation::taxonomy;
use snapsong_api::services::{RankingMode, RecommendationService, VisionService};
use std::sync::Arc;

fn keywords(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn neutral_context() -> QueryContext {
    QueryContext::from_attributes(&ImageAttributes::default())
}

fn service(catalog: Arc<TableCatalog>) -> RecommendationService {
    RecommendationService::new(
        VisionService::new(Arc::new(ScriptedVision::offline())),
        catalog,
        None,
    )
}

#[tokio::test]
async fn test_rock_jazz_scenario() {
    let catalog = Arc::new(
        TableCatalog::new()
            .with("Rock", vec![track("A", 80), track("B", 60)])
            .with("Jazz", vec![track("B", 60), track("C", 40)]),
    );

    let tracks = service(catalog.clone())
        .recommend(&keywords(&["Rock", "Jazz"]), &neutral_context(), RankingMode::Basic)
        .await;

    let summary: Vec<(&str, f64, Option<&str>)> = tracks
        .iter()
        .map(|t| (t.id.as_str(), t.relevance, t.match_type.as_deref()))
        .collect();
    assert_eq!(
        summary,
        [
            ("A", 94.0, Some("Rock")),
            ("B", 81.0, Some("Rock")),
            ("C", 68.0, Some("Jazz")),
        ]
    );
    assert_eq!(catalog.calls(), ["Rock", "Jazz", "Rock Jazz"]);
}

#[tokio::test]
async fn test_one_failing_query_among_three() {
    let catalog = Arc::new(
        TableCatalog::new()
            .with("Rock", vec![track("A", 80)])
            .failing("Jazz")
            .with("Blues", vec![track("C", 40)]),
    );

    let tracks = service(catalog)
        .recommend(
            &keywords(&["Rock", "Jazz", "Blues"]),
            &neutral_context(),
            RankingMode::Basic,
        )
        .await;

    let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["A", "C"]);
}

#[tokio::test]
async fn test_empty_keywords_use_fallback_queries() {
    let catalog = Arc::new(TableCatalog::new().with("trending", vec![track("T", 55)]));

    let tracks = service(catalog.clone())
        .recommend(&[], &neutral_context(), RankingMode::Basic)
        .await;

    assert_eq!(catalog.calls(), ["popular", "trending", "top hits"]);
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].match_type.as_deref(), Some("Popular"));
}

#[tokio::test]
async fn test_every_query_failing_yields_empty_result() {
    let catalog = Arc::new(
        TableCatalog::new()
            .failing("Rock")
            .failing("popular"),
    );

    let tracks = service(catalog)
        .recommend(&keywords(&["Rock"]), &neutral_context(), RankingMode::Enhanced)
        .await;

    assert!(tracks.is_empty());
}

#[tokio::test]
async fn test_ranking_twice_is_stable() {
    let mut catalog = TableCatalog::new();
    let mut batch = Vec::new();
    for i in 0..12 {
        batch.push(track(&format!("t{}", i), (i * 7 % 100) as u32));
    }
    catalog = catalog.with("Rock", batch);
    let catalog = Arc::new(catalog);

    let words = keywords(&["Rock"]);
    let tracks = service(catalog)
        .recommend(&words, &neutral_context(), RankingMode::Enhanced)
        .await;
    let reranked = ranker::rank(&tracks, &words, None, RankingMode::Enhanced);

    assert_eq!(tracks.len(), 12);
    assert!(tracks.iter().all(|t| (0.0..=100.0).contains(&t.relevance)));
    assert_eq!(
        tracks.iter().map(|t| &t.id).collect::<Vec<_>>(),
        reranked.iter().map(|t| &t.id).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_regional_catalog_filters_foreign_tracks() {
    let catalog = Arc::new(
        TableCatalog::new()
            .with(
                "Malayalam Rock",
                vec![track_by("ml1", "KS Chithra", 60), track("en1", 90)],
            )
            .with("Malayalam songs", vec![track("staple1", 40)]),
    );
    let service = RecommendationService::new(
        VisionService::new(Arc::new(ScriptedVision::offline())),
        catalog.clone(),
        taxonomy::region("malayalam"),
    );

    let tracks = service
        .recommend(&keywords(&["Rock"]), &neutral_context(), RankingMode::Basic)
        .await;

    let ids: Vec<&str> = tracks.iter().map(|t| t.id.as_str()).collect();
    // the prefixed keyword query gates foreign tracks; staple queries name the region themselves
    assert_eq!(ids, ["ml1", "staple1"]);
    assert!(catalog.calls().iter().all(|q| q.contains("Malayalam")));
}

#[tokio::test]
async fn test_plan_never_exceeds_query_budget() {
    let catalog = Arc::new(TableCatalog::new());
    let many: Vec<String> = (0..20).map(|i| format!("word{}", i)).collect();

    let tracks = service(catalog.clone())
        .recommend(&many, &neutral_context(), RankingMode::Enhanced)
        .await;

    // nothing is found, so the combined and last-resort queries both run
    assert!(tracks.is_empty());
    let calls = catalog.calls();
    assert_eq!(calls.len(), 15);
    assert_eq!(calls[13], "word0 word1 word2");
    assert_eq!(calls[14], "popular");
}

#[rstest]
#[case("**Music Keywords:** Rock, Upbeat, Guitar-driven", &["Rock", "Upbeat", "Guitar-driven"], KeywordSource::Structured)]
#[case("", &["Popular music", "Trending songs", "Recommended tracks"], KeywordSource::Fallback)]
fn test_keyword_extraction_properties(
    #[case] description: &str,
    #[case] expected: &[&str],
    #[case] source: KeywordSource,
) {
    let extracted = extract_keywords(description);
    assert_eq!(extracted.as_slice(), expected);
    assert_eq!(extracted.primary(), expected[0]);
    assert_eq!(extracted.source(), source);
}

#[test]
fn test_taxonomy_terms_never_hit_terminal_fallback() {
    let extracted = extract_keywords("A smoky Jazz club on a Romantic evening.");
    assert_eq!(extracted.source(), KeywordSource::Taxonomy);
    assert!(!extracted.as_slice().is_empty());
}
