//! Image-to-music recommendation pipeline
//!
//! One analysis runs these stages in order:
//!
//! 1. The vision model describes the image and reports its attributes
//! 2. [`keywords`] turns the description into search keywords
//! 3. [`planner`] expands keywords and attribute context into catalog queries
//! 4. [`aggregator`] runs the queries and merges deduplicated candidates
//! 5. [`ranker`] scores, labels and orders the candidates
//!
//! Collaborator failures are absorbed by the stage that sees them, so an
//! analysis of a valid upload degrades rather than fails.

pub mod aggregator;
pub mod context;
pub mod keywords;
pub mod planner;
pub mod ranker;
pub mod taxonomy;

use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::ApiResult;
use crate::models::{AnalyzeResponse, TrackCandidate};
use crate::services::catalog::CatalogSearch;
use crate::services::vision::{normalize_image, VisionService};

use aggregator::{AcceptAll, Aggregator, RegionalFilter, TrackFilter};
use context::QueryContext;
use keywords::{extract_keywords, section, CAPTION_LABEL, DESCRIPTION_LABEL};
use planner::QueryPlanner;
use taxonomy::RegionProfile;

/// Which flavour of the pipeline to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingMode {
    /// Keyword queries only, ranked by relevance, at most 10 tracks
    Basic,
    /// Adds contextual queries and diversity reordering, at most 15 tracks
    Enhanced,
}

impl RankingMode {
    /// Maximum number of tracks returned
    pub fn output_bound(self) -> usize {
        match self {
            RankingMode::Basic => 10,
            RankingMode::Enhanced => 15,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RankingMode::Basic => "basic",
            RankingMode::Enhanced => "enhanced",
        }
    }
}

/// Runs the full analysis for one uploaded image
#[derive(Clone)]
pub struct RecommendationService {
    vision: VisionService,
    catalog: Arc<dyn CatalogSearch>,
    filter: Arc<dyn TrackFilter>,
    planner: QueryPlanner,
}

impl RecommendationService {
    /// Create the service, optionally restricted to a regional catalog
    pub fn new(
        vision: VisionService,
        catalog: Arc<dyn CatalogSearch>,
        region: Option<&'static RegionProfile>,
    ) -> Self {
        let filter: Arc<dyn TrackFilter> = match region {
            Some(profile) => Arc::new(RegionalFilter::new(profile)),
            None => Arc::new(AcceptAll),
        };

        Self {
            vision,
            catalog,
            filter,
            planner: QueryPlanner::new(region),
        }
    }

    /// Analyze an uploaded image and recommend tracks for it
    #[instrument(skip(self, image), fields(mode = mode.as_str(), upload_bytes = image.len()))]
    pub async fn analyze(&self, image: Vec<u8>, mode: RankingMode) -> ApiResult<AnalyzeResponse> {
        let image = tokio::task::spawn_blocking(move || normalize_image(image)).await?;

        let description = self.vision.describe(&image).await;
        let attributes = self.vision.attributes(&image).await;

        let keywords = extract_keywords(&description);
        let context = QueryContext::from_attributes(&attributes);

        info!(
            keywords = ?keywords.as_slice(),
            source = ?keywords.source(),
            scene = %attributes.scene,
            mood = %attributes.mood,
            emotion = %attributes.emotion,
            "Image analyzed"
        );

        let tracks = self.recommend(keywords.as_slice(), &context, mode).await;

        Ok(AnalyzeResponse {
            image_description: section(&description, DESCRIPTION_LABEL)
                .unwrap_or(&description)
                .to_string(),
            primary_keyword: keywords.primary().to_string(),
            instagram_caption: section(&description, CAPTION_LABEL)
                .unwrap_or_default()
                .to_string(),
            image_keywords: keywords.into_vec(),
            spotify_tracks: tracks,
            scene: attributes.scene,
            mood: attributes.mood,
            emotion: attributes.emotion,
            dominant_color: attributes.dominant_color,
        })
    }

    /// Plan, aggregate and rank tracks for already extracted keywords
    pub async fn recommend(
        &self,
        keywords: &[String],
        context: &QueryContext,
        mode: RankingMode,
    ) -> Vec<TrackCandidate> {
        let plan = self.planner.plan(keywords, Some(context), mode);
        let candidates = Aggregator::new(self.catalog.as_ref(), self.filter.as_ref())
            .collect(&plan)
            .await;
        let ranked = ranker::rank(&candidates, keywords, Some(context), mode);

        info!(
            queries = plan.queries.len(),
            candidates = candidates.len(),
            returned = ranked.len(),
            region = self.planner.region().map(|r| r.key),
            "Recommendations ready"
        );

        ranked
    }
}
