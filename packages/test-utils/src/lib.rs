//! Shared test utilities for Snapsong workspace
//!
//! This crate provides mock implementations of external services for testing
//! without network dependencies. These mocks are used by the client crates
//! and the API test suites.
//!
//! # Mock Services
//!
//! - [`MockOllamaServer`] - Mock Ollama vision server for describe/attribute tests
//! - [`MockSpotifyServer`] - Mock Spotify accounts + search endpoints
//!
//! # Example
//!
//! ```rust,ignore
//! use snapsong_test_utils::{MockSpotifyServer, TrackFixture};
//!
//! #[tokio::test]
//! async fn test_with_mocks() {
//!     let spotify = MockSpotifyServer::start().await;
//!     spotify.mock_token_success().await;
//!     spotify
//!         .mock_search("jazz music", vec![TrackFixture::new("t1", "So What", "Miles Davis")])
//!         .await;
//!
//!     // Use spotify.config() to configure your client
//! }
//! ```

mod ollama;
mod spotify;

pub use ollama::MockOllamaServer;
pub use spotify::{MockSpotifyServer, TrackFixture};
