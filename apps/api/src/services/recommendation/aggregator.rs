//! Result aggregation across catalog queries
//!
//! Queries run one at a time in priority order. The first query to return a
//! track owns it: later duplicates are dropped, so metadata and the match
//! label always come from the highest-priority query.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::planner::{PlannedQuery, QueryPlan};
use super::taxonomy::RegionProfile;
use crate::models::TrackCandidate;
use crate::services::catalog::{CatalogSearch, CatalogTrack};

/// Stop issuing queries once this many candidates are collected
pub const MAX_CANDIDATES: usize = 30;

/// Below this many candidates the supplemental combined query runs
pub const SUPPLEMENT_THRESHOLD: usize = 5;

/// Acceptance predicate applied to every new candidate
pub trait TrackFilter: Send + Sync {
    fn accepts(&self, candidate: &TrackCandidate, query: &PlannedQuery) -> bool;
}

/// Accepts every track
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl TrackFilter for AcceptAll {
    fn accepts(&self, _candidate: &TrackCandidate, _query: &PlannedQuery) -> bool {
        true
    }
}

/// Accepts tracks that belong to one regional catalog
///
/// A track belongs when its name, artist or album mentions a region
/// indicator, an artist is one of the region's known artists, the name or
/// album mentions one of the region's films, or the query that found it
/// named the region before the planner prefixed it.
#[derive(Debug, Clone, Copy)]
pub struct RegionalFilter {
    profile: &'static RegionProfile,
}

impl RegionalFilter {
    pub fn new(profile: &'static RegionProfile) -> Self {
        Self { profile }
    }
}

impl TrackFilter for RegionalFilter {
    fn accepts(&self, candidate: &TrackCandidate, query: &PlannedQuery) -> bool {
        let profile = self.profile;
        let mentions_region = |text: &str| profile.indicators.iter().any(|i| text.contains(i));

        if query.names_region {
            return true;
        }

        if mentions_region(&candidate.searchable_text()) {
            return true;
        }

        let artist = candidate.artist.to_lowercase();
        if profile
            .artists
            .iter()
            .any(|known| artist.contains(&known.to_lowercase()))
        {
            return true;
        }

        let title = format!("{} {}", candidate.name, candidate.album).to_lowercase();
        profile
            .films
            .iter()
            .any(|film| title.contains(&film.to_lowercase()))
    }
}

/// Deduplicated candidates in discovery order
#[derive(Debug, Default)]
struct Aggregate {
    candidates: Vec<TrackCandidate>,
    seen: HashSet<String>,
}

impl Aggregate {
    fn is_full(&self) -> bool {
        self.candidates.len() >= MAX_CANDIDATES
    }

    /// Merge one query's batch; returns how many tracks were added
    fn merge(
        &mut self,
        query: &PlannedQuery,
        batch: &[CatalogTrack],
        filter: &dyn TrackFilter,
    ) -> usize {
        let before = self.candidates.len();

        for track in batch {
            if self.is_full() {
                break;
            }

            let Some(candidate) = TrackCandidate::from_catalog(track, Some(query.label.as_str())) else {
                continue;
            };
            if self.seen.contains(&candidate.id) || !filter.accepts(&candidate, query) {
                continue;
            }

            self.seen.insert(candidate.id.clone());
            self.candidates.push(candidate);
        }

        self.candidates.len() - before
    }
}

/// Runs a query plan against the catalog and merges the results
pub struct Aggregator<'a> {
    catalog: &'a dyn CatalogSearch,
    filter: &'a dyn TrackFilter,
}

impl<'a> Aggregator<'a> {
    pub fn new(catalog: &'a dyn CatalogSearch, filter: &'a dyn TrackFilter) -> Self {
        Self { catalog, filter }
    }

    /// Collect deduplicated candidates for a plan
    ///
    /// A failing query is logged and skipped; it never fails the whole run.
    pub async fn collect(&self, plan: &QueryPlan) -> Vec<TrackCandidate> {
        let mut aggregate = Aggregate::default();

        for query in &plan.queries {
            if aggregate.is_full() {
                debug!(count = aggregate.candidates.len(), "Candidate cap reached");
                break;
            }
            self.run(query, &mut aggregate).await;
        }

        if let Some(supplemental) = &plan.supplemental {
            if aggregate.candidates.len() < SUPPLEMENT_THRESHOLD {
                debug!(
                    count = aggregate.candidates.len(),
                    query = %supplemental.text,
                    "Few candidates, trying combined query"
                );
                self.run(supplemental, &mut aggregate).await;
            }
        }

        if aggregate.candidates.is_empty() {
            debug!(query = %plan.last_resort.text, "No candidates, trying last-resort query");
            self.run(&plan.last_resort, &mut aggregate).await;
        }

        aggregate.candidates
    }

    async fn run(&self, query: &PlannedQuery, aggregate: &mut Aggregate) {
        match self.catalog.search_tracks(&query.text, query.limit).await {
            Ok(batch) => {
                let added = aggregate.merge(query, &batch, self.filter);
                debug!(
                    query = %query.text,
                    returned = batch.len(),
                    added,
                    "Catalog query merged"
                );
            }
            Err(e) => {
                warn!(query = %query.text, error = %e, "Catalog query failed, skipping");
            }
        }
    }
}
