//! Business logic services for Snapsong
//!
//! This module contains:
//! - The catalog search seam
//! - The vision model service
//! - The recommendation pipeline
//! - Health checks

pub mod catalog;
pub mod health;
pub mod recommendation;
pub mod vision;

pub use catalog::{CatalogError, CatalogResult, CatalogSearch, CatalogTrack};
pub use health::HealthService;
pub use recommendation::{RankingMode, RecommendationService};
pub use vision::{VisionModel, VisionService};
