//! Spotify Web API client implementation

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Client, Response, StatusCode};
use snapsong_shared_config::SpotifyConfig;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::error::{SpotifyError, SpotifyResult};
use crate::models::{ApiErrorResponse, AuthErrorResponse, SearchResponse, TokenResponse, Track};

/// Default connection timeout in seconds
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Largest page size the search endpoint accepts
const MAX_SEARCH_LIMIT: u32 = 50;

/// Maximum query length sent to the search endpoint
const MAX_QUERY_LENGTH: usize = 250;

/// Tokens are refreshed this long before they expire
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Default number of retry attempts for transient failures
const DEFAULT_MAX_RETRIES: u32 = 2;

/// Base delay for exponential backoff (milliseconds)
const RETRY_BASE_DELAY_MS: u64 = 100;

/// Longest server-requested wait honoured before giving up (seconds)
const MAX_RETRY_AFTER_SECS: u64 = 5;

/// Client-credentials access token
#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN < self.expires_at
    }
}

/// Spotify Web API client
///
/// Clones share the same connection pool and token cache.
#[derive(Clone)]
pub struct SpotifyClient {
    http_client: Client,
    config: SpotifyConfig,
    token: Arc<RwLock<Option<CachedToken>>>,
    max_retries: u32,
}

impl fmt::Debug for SpotifyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyClient")
            .field("client_id", &self.config.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("api_url", &self.config.api_url)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl SpotifyClient {
    /// Create a new Spotify client from configuration
    ///
    /// # Errors
    /// Returns `SpotifyError::MissingCredentials` if the client ID or secret is empty
    pub fn new(config: &SpotifyConfig) -> SpotifyResult<Self> {
        if !config.has_credentials() {
            return Err(SpotifyError::MissingCredentials);
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent("Snapsong/1.0")
            .build()?;

        Ok(Self {
            http_client,
            config: config.clone(),
            token: Arc::new(RwLock::new(None)),
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Set the number of retries for transient failures
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &SpotifyConfig {
        &self.config
    }

    /// Validate and normalize a search query
    fn validate_query(query: &str) -> SpotifyResult<String> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(SpotifyError::InvalidInput(
                "search query cannot be empty".to_string(),
            ));
        }
        Ok(trimmed.chars().take(MAX_QUERY_LENGTH).collect())
    }

    /// Execute an operation with retry logic for transient failures
    async fn with_retry<T, F, Fut>(&self, operation: F) -> SpotifyResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = SpotifyResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay_ms = match &e {
                        SpotifyError::RateLimited {
                            retry_after: Some(secs),
                        } => {
                            if *secs > MAX_RETRY_AFTER_SECS {
                                warn!(retry_after = secs, "Rate limit wait too long, giving up");
                                return Err(e);
                            }
                            secs.saturating_mul(1000)
                        }
                        _ => RETRY_BASE_DELAY_MS.saturating_mul(2u64.saturating_pow(attempt)),
                    };
                    warn!(
                        attempt = attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Spotify request failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn map_send_error(e: reqwest::Error) -> SpotifyError {
        if e.is_timeout() {
            SpotifyError::Timeout
        } else {
            SpotifyError::Http(e)
        }
    }

    /// Return a fresh access token, fetching a new one when the cache is stale
    async fn access_token(&self) -> SpotifyResult<String> {
        if let Some(token) = self.token.read().await.as_ref() {
            if token.is_fresh() {
                return Ok(token.access_token.clone());
            }
        }

        let mut slot = self.token.write().await;
        // Another task may have refreshed while we waited for the lock
        if let Some(token) = slot.as_ref() {
            if token.is_fresh() {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        *slot = Some(token);
        Ok(access_token)
    }

    /// Drop the cached token so the next request authenticates again
    async fn invalidate_token(&self) {
        *self.token.write().await = None;
    }

    async fn request_token(&self) -> SpotifyResult<CachedToken> {
        debug!("Requesting Spotify access token");

        let response = self
            .http_client
            .post(&self.config.auth_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<AuthErrorResponse>(&text)
                .map(|e| e.error_description.unwrap_or(e.error))
                .unwrap_or_else(|_| text.chars().take(200).collect());

            if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
                return Err(SpotifyError::Unauthorized(message));
            }
            return Err(SpotifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = serde_json::from_str(&text)?;
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        })
    }

    /// Turn a non-success Web API response into an error
    async fn error_from_response(response: Response) -> SpotifyError {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            warn!(?retry_after, "Spotify API rate limited");
            return SpotifyError::RateLimited { retry_after };
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorResponse>(&text)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| text.chars().take(200).collect());

        if status == StatusCode::UNAUTHORIZED {
            return SpotifyError::Unauthorized(message);
        }

        SpotifyError::Api {
            status: status.as_u16(),
            message,
        }
    }

    async fn search_with_token(&self, query: &str, limit: u32) -> SpotifyResult<Vec<Track>> {
        let token = self.access_token().await?;
        let limit_str = limit.to_string();

        let mut params = vec![("q", query), ("type", "track"), ("limit", limit_str.as_str())];
        if let Some(market) = self.config.market.as_deref() {
            params.push(("market", market));
        }

        let response = self
            .http_client
            .get(self.config.search_url())
            .bearer_auth(token)
            .query(&params)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let text = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&text)?;
        Ok(parsed.into_tracks())
    }

    /// Search once, re-authenticating a single time if the token was rejected
    async fn search_once(&self, query: &str, limit: u32) -> SpotifyResult<Vec<Track>> {
        match self.search_with_token(query, limit).await {
            Err(SpotifyError::Unauthorized(reason)) => {
                debug!(%reason, "Access token rejected, re-authenticating");
                self.invalidate_token().await;
                self.search_with_token(query, limit).await
            }
            other => other,
        }
    }

    /// Search the catalog for tracks matching a free-text query
    ///
    /// # Arguments
    /// * `query` - Free-text query (trimmed, truncated to 250 characters)
    /// * `limit` - Maximum number of tracks, clamped to 1..=50
    ///
    /// # Errors
    /// - `SpotifyError::InvalidInput` - If the query is blank
    /// - `SpotifyError::Unauthorized` - If the credentials are rejected
    /// - `SpotifyError::RateLimited` - If retries could not outlast rate limiting
    /// - `SpotifyError::Api` - If Spotify returns any other error
    #[instrument(skip(self))]
    pub async fn search_tracks(&self, query: &str, limit: u32) -> SpotifyResult<Vec<Track>> {
        let query = Self::validate_query(query)?;
        let limit = limit.clamp(1, MAX_SEARCH_LIMIT);

        let tracks = self
            .with_retry(|| async { self.search_once(&query, limit).await })
            .await?;

        debug!(query = %query, result_count = tracks.len(), "Spotify search complete");

        Ok(tracks)
    }

    /// Check that the configured credentials can obtain an access token
    pub async fn validate_credentials(&self) -> SpotifyResult<()> {
        self.access_token().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token_response() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "test-token",
            "token_type": "Bearer",
            "expires_in": 3600
        }))
    }

    fn search_response() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tracks": {
                "items": [
                    {
                        "id": "t1",
                        "name": "So What",
                        "artists": [{"name": "Miles Davis"}],
                        "album": {"name": "Kind of Blue", "images": [{"url": "https://img/1"}]},
                        "external_urls": {"spotify": "https://open.spotify.com/track/t1"},
                        "popularity": 80
                    },
                    {"id": "t2", "name": "Untitled"}
                ]
            }
        }))
    }

    fn test_client(server: &MockServer) -> SpotifyClient {
        let config = SpotifyConfig::with_base_url(server.uri(), "client-id", "client-secret");
        SpotifyClient::new(&config).unwrap().with_max_retries(0)
    }

    #[test]
    fn test_client_requires_credentials() {
        let config = SpotifyConfig::with_base_url("http://localhost", "", "");
        let result = SpotifyClient::new(&config);
        assert!(matches!(result, Err(SpotifyError::MissingCredentials)));
    }

    #[test]
    fn test_client_debug_redacts_secret() {
        let config = SpotifyConfig::with_base_url("http://localhost", "id", "super-secret");
        let client = SpotifyClient::new(&config).unwrap();
        let debug_str = format!("{:?}", client);
        assert!(!debug_str.contains("super-secret"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_validate_query() {
        assert!(matches!(
            SpotifyClient::validate_query("   "),
            Err(SpotifyError::InvalidInput(_))
        ));
        assert_eq!(SpotifyClient::validate_query("  jazz  ").unwrap(), "jazz");

        let long = "a".repeat(MAX_QUERY_LENGTH + 40);
        assert_eq!(
            SpotifyClient::validate_query(&long).unwrap().len(),
            MAX_QUERY_LENGTH
        );
    }

    #[tokio::test]
    async fn test_search_tracks_authenticates_and_parses() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(token_response())
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("q", "jazz music"))
            .and(query_param("type", "track"))
            .and(query_param("limit", "10"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(search_response())
            .mount(&server)
            .await;

        let client = test_client(&server);
        let tracks = client.search_tracks("jazz music", 10).await.unwrap();

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].artist_names(), "Miles Davis");
        assert!(tracks[1].popularity.is_none());
    }

    #[tokio::test]
    async fn test_token_is_cached_between_searches() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(token_response())
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(search_response())
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server);
        client.search_tracks("rock", 5).await.unwrap();
        client.clone().search_tracks("pop", 5).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_token_is_refreshed_once() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(token_response())
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"status": 401, "message": "The access token expired"}
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(search_response())
            .mount(&server)
            .await;

        let client = test_client(&server);
        let tracks = client.search_tracks("ambient", 10).await.unwrap();
        assert_eq!(tracks.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_client",
                "error_description": "Invalid client secret"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        match client.validate_credentials().await {
            Err(SpotifyError::Unauthorized(message)) => {
                assert_eq!(message, "Invalid client secret")
            }
            other => panic!("Expected Unauthorized, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_limit_is_clamped() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(token_response())
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .and(query_param("limit", "50"))
            .respond_with(search_response())
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        client.search_tracks("chill", 500).await.unwrap();
    }

    #[tokio::test]
    async fn test_rate_limited_reports_retry_after() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(token_response())
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "3"))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let result = client.search_tracks("lofi", 10).await;
        assert!(matches!(
            result,
            Err(SpotifyError::RateLimited {
                retry_after: Some(3)
            })
        ));
    }

    #[tokio::test]
    async fn test_long_retry_after_is_not_waited_out() {
        let server = MockServer::start().await;

        // the second value overflows a naive seconds-to-millis conversion
        for retry_after in ["3600", "18446744073709552"] {
            server.reset().await;
            Mock::given(method("POST"))
                .and(path("/api/token"))
                .respond_with(token_response())
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/v1/search"))
                .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", retry_after))
                .expect(1)
                .mount(&server)
                .await;

            let config = SpotifyConfig::with_base_url(server.uri(), "client-id", "client-secret");
            let client = SpotifyClient::new(&config).unwrap().with_max_retries(2);

            let result = tokio::time::timeout(
                Duration::from_secs(2),
                client.search_tracks("lofi", 10),
            )
            .await
            .expect("search should not sleep on a long Retry-After");

            assert!(matches!(result, Err(SpotifyError::RateLimited { retry_after: Some(_) })));
            server.verify().await;
        }
    }

    #[tokio::test]
    async fn test_short_retry_after_is_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(token_response())
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(search_response())
            .mount(&server)
            .await;

        let config = SpotifyConfig::with_base_url(server.uri(), "client-id", "client-secret");
        let client = SpotifyClient::new(&config).unwrap().with_max_retries(1);
        let tracks = client.search_tracks("lofi", 10).await.unwrap();
        assert_eq!(tracks.len(), 2);
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(token_response())
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/search"))
            .respond_with(search_response())
            .mount(&server)
            .await;

        let config = SpotifyConfig::with_base_url(server.uri(), "client-id", "client-secret");
        let client = SpotifyClient::new(&config).unwrap().with_max_retries(1);
        let tracks = client.search_tracks("soul", 10).await.unwrap();
        assert_eq!(tracks.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_query_sends_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(token_response())
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let result = client.search_tracks("  ", 10).await;
        assert!(matches!(result, Err(SpotifyError::InvalidInput(_))));
    }
}
