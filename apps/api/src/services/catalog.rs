//! Catalog search seam
//!
//! The recommendation pipeline talks to the music catalog only through
//! [`CatalogSearch`], so tests can swap in an in-memory catalog.

use axum::async_trait;
use snapsong_spotify_client::{SpotifyClient, SpotifyError};
use thiserror::Error;

/// Raw track record returned by the catalog
pub type CatalogTrack = snapsong_spotify_client::Track;

/// Failure of a single catalog query
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Spotify(#[from] SpotifyError),

    /// Catalog could not be reached or refused the query
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Executes one text query against the music catalog
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    async fn search_tracks(&self, query: &str, limit: u32) -> CatalogResult<Vec<CatalogTrack>>;
}

#[async_trait]
impl CatalogSearch for SpotifyClient {
    async fn search_tracks(&self, query: &str, limit: u32) -> CatalogResult<Vec<CatalogTrack>> {
        Ok(SpotifyClient::search_tracks(self, query, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use snapsong_test_utils::{MockSpotifyServer, TrackFixture};

    #[tokio::test]
    async fn test_spotify_client_implements_catalog_search() {
        let server = MockSpotifyServer::start().await;
        server.mock_token_success().await;
        server
            .mock_search("rock music", vec![TrackFixture::new("r1", "Song", "Band")])
            .await;

        let client = SpotifyClient::new(&server.config()).unwrap();
        let catalog: &dyn CatalogSearch = &client;

        let tracks = catalog.search_tracks("rock music", 5).await.unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn test_spotify_errors_are_wrapped() {
        let server = MockSpotifyServer::start().await;
        server.mock_token_success().await;

        let client = SpotifyClient::new(&server.config()).unwrap();
        let err = CatalogSearch::search_tracks(&client, "   ", 5).await.unwrap_err();
        assert_matches!(err, CatalogError::Spotify(SpotifyError::InvalidInput(_)));
    }
}
