//! Mock Spotify server for testing catalog search
//!
//! Provides a [`MockSpotifyServer`] that serves both the accounts token
//! endpoint and the Web API search endpoint from one address, matching the
//! layout of [`SpotifyConfig::with_base_url`].

use serde_json::json;
use snapsong_shared_config::SpotifyConfig;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CLIENT_ID: &str = "test-client-id";
const CLIENT_SECRET: &str = "test-client-secret";

/// Mock Spotify server for testing catalog searches
///
/// # Example
///
/// ```rust,ignore
/// use snapsong_test_utils::{MockSpotifyServer, TrackFixture};
///
/// #[tokio::test]
/// async fn test_search() {
///     let server = MockSpotifyServer::start().await;
///     server.mock_token_success().await;
///     server.mock_search("rock music", vec![TrackFixture::new("r1", "Song", "Band")]).await;
///     server.mock_search_failure("jazz music", 500).await;
/// }
/// ```
pub struct MockSpotifyServer {
    server: MockServer,
}

impl MockSpotifyServer {
    /// Start a new mock Spotify server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Get the server URL
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Client configuration pointing at this server with test credentials
    pub fn config(&self) -> SpotifyConfig {
        SpotifyConfig::with_base_url(self.url(), CLIENT_ID, CLIENT_SECRET)
    }

    /// Mount a successful client-credentials token response
    pub async fn mock_token_success(&self) {
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "mock-access-token",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a rejected-credentials token response
    pub async fn mock_token_failure(&self) {
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_client",
                "error_description": "Invalid client"
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount search results for one exact query string
    pub async fn mock_search(&self, query: &str, tracks: Vec<TrackFixture>) {
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("q", query))
            .respond_with(search_body(tracks))
            .mount(&self.server)
            .await;
    }

    /// Mount search results for any query not matched by a more specific mock
    ///
    /// Mount this after the per-query mocks so those take precedence.
    pub async fn mock_search_any(&self, tracks: Vec<TrackFixture>) {
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(search_body(tracks))
            .mount(&self.server)
            .await;
    }

    /// Mount a failure for one exact query string
    pub async fn mock_search_failure(&self, query: &str, status_code: u16) {
        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("q", query))
            .respond_with(ResponseTemplate::new(status_code).set_body_json(json!({
                "error": { "status": status_code, "message": "mock failure" }
            })))
            .mount(&self.server)
            .await;
    }

    /// Queries received by the search endpoint, in arrival order
    pub async fn received_queries(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == "/v1/search")
            .filter_map(|r| {
                r.url
                    .query_pairs()
                    .find(|(k, _)| k == "q")
                    .map(|(_, v)| v.into_owned())
            })
            .collect()
    }

    /// Get reference to the underlying mock server for custom mock setups
    pub fn inner(&self) -> &MockServer {
        &self.server
    }
}

fn search_body(tracks: Vec<TrackFixture>) -> ResponseTemplate {
    let items: Vec<serde_json::Value> = tracks.iter().map(TrackFixture::to_json).collect();
    ResponseTemplate::new(200).set_body_json(json!({
        "tracks": { "items": items }
    }))
}

/// Fixture for creating Spotify track objects
#[derive(Debug, Clone)]
pub struct TrackFixture {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    pub album_art: Option<String>,
    pub preview_url: Option<String>,
    pub popularity: Option<u32>,
    pub release_date: Option<String>,
}

impl TrackFixture {
    /// Create a track with one artist and no popularity score
    pub fn new(id: &str, name: &str, artist: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            artists: vec![artist.to_string()],
            album: format!("{} (Album)", name),
            album_art: Some(format!("https://i.scdn.co/image/{}", id)),
            preview_url: None,
            popularity: None,
            release_date: Some("2020-01-01".to_string()),
        }
    }

    /// Set the popularity score
    pub fn with_popularity(mut self, popularity: u32) -> Self {
        self.popularity = Some(popularity);
        self
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> serde_json::Value {
        let images: Vec<serde_json::Value> = self
            .album_art
            .iter()
            .map(|url| json!({ "url": url, "height": 640, "width": 640 }))
            .collect();
        let artists: Vec<serde_json::Value> =
            self.artists.iter().map(|name| json!({ "name": name })).collect();

        json!({
            "id": self.id,
            "name": self.name,
            "artists": artists,
            "album": {
                "name": self.album,
                "images": images,
                "release_date": self.release_date
            },
            "preview_url": self.preview_url,
            "external_urls": { "spotify": format!("https://open.spotify.com/track/{}", self.id) },
            "popularity": self.popularity
        })
    }
}
