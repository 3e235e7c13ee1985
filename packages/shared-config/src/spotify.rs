//! Spotify catalog configuration types

use std::env;
use std::fmt;

use crate::{get_env_or_default, parse_env, validate_http_url, ConfigResult};

/// Spotify Web API configuration (client-credentials flow)
#[derive(Clone)]
pub struct SpotifyConfig {
    /// Application client ID
    pub client_id: String,

    /// Application client secret
    pub client_secret: String,

    /// Web API base URL
    pub api_url: String,

    /// Accounts service token endpoint
    pub auth_url: String,

    /// Optional ISO 3166-1 market code applied to searches
    pub market: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl fmt::Debug for SpotifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("auth_url", &self.auth_url)
            .field("market", &self.market)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SpotifyConfig {
    /// Load Spotify configuration from environment variables
    ///
    /// Missing credentials are not an error here: they load as empty strings
    /// and the client refuses to start with them. Production callers check
    /// [`SpotifyConfig::has_credentials`] up front.
    pub fn from_env() -> ConfigResult<Self> {
        let api_url = get_env_or_default("SPOTIFY_API_URL", "https://api.spotify.com/v1");
        validate_http_url("SPOTIFY_API_URL", &api_url)?;

        let auth_url = get_env_or_default(
            "SPOTIFY_AUTH_URL",
            "https://accounts.spotify.com/api/token",
        );
        validate_http_url("SPOTIFY_AUTH_URL", &auth_url)?;

        Ok(Self {
            client_id: env::var("SPOTIFY_CLIENT_ID").unwrap_or_default(),
            client_secret: env::var("SPOTIFY_CLIENT_SECRET").unwrap_or_default(),
            api_url,
            auth_url,
            market: env::var("SPOTIFY_MARKET")
                .ok()
                .map(|m| m.trim().to_uppercase())
                .filter(|m| !m.is_empty()),
            timeout_secs: parse_env("SPOTIFY_TIMEOUT", 10)?,
        })
    }

    /// Create a configuration pointing both endpoints at a single base URL
    /// (useful for testing against a mock server)
    pub fn with_base_url(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        let base = base_url.into();
        let base = base.trim_end_matches('/');
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_url: format!("{}/v1", base),
            auth_url: format!("{}/api/token", base),
            market: None,
            timeout_secs: 10,
        }
    }

    /// Check whether both halves of the client-credentials pair are set
    pub fn has_credentials(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }

    /// Get the full URL for the search endpoint
    pub fn search_url(&self) -> String {
        format!("{}/search", self.api_url.trim_end_matches('/'))
    }
}
