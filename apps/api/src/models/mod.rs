//! Data models for Snapsong
//!
//! This module contains the wire and pipeline types for:
//! - Catalog track candidates
//! - Image attributes and the analyze response

pub mod analysis;
pub mod track;

pub use analysis::{AnalyzeResponse, ImageAttributes};
pub use track::TrackCandidate;
