//! API server configuration

use std::env;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use snapsong_shared_config::{
    parse_env, CommonConfig, Environment, OllamaConfig, SpotifyConfig,
};

/// Default multipart body limit (10 MiB)
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Common configuration shared with the client crates
    pub common: CommonConfig,

    /// Server port (default: 8080)
    pub port: u16,

    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,

    /// CORS allowed origins (optional)
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// In production mode, `SPOTIFY_CLIENT_ID` and `SPOTIFY_CLIENT_SECRET`
    /// must be set. In development the catalog client itself refuses to
    /// start without them, which gives the same outcome with a less
    /// specific message.
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_str(
            &env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        )
        .unwrap_or_default();

        let common = CommonConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if environment.is_production() {
            Self::validate_spotify_credentials(&common.spotify)?;
        }

        let max_upload_bytes = parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        if max_upload_bytes == 0 {
            bail!("MAX_UPLOAD_BYTES must be greater than zero");
        }

        Ok(Self {
            common,

            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT value")?,

            max_upload_bytes,

            cors_allowed_origins: env::var("CORS_ORIGINS").ok().map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
        })
    }

    /// Validate that the Spotify client-credentials pair is explicitly set
    fn validate_spotify_credentials(spotify: &SpotifyConfig) -> Result<()> {
        if spotify.has_credentials() {
            Ok(())
        } else {
            bail!(
                "SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET are required in production. \
                 Create an app at developer.spotify.com to obtain them."
            );
        }
    }

    // Convenience accessors for common config fields

    /// Get Ollama configuration
    pub fn ollama(&self) -> &OllamaConfig {
        &self.common.ollama
    }

    /// Get Spotify configuration
    pub fn spotify(&self) -> &SpotifyConfig {
        &self.common.spotify
    }

    /// Get the configured regional catalog profile name
    pub fn catalog_region(&self) -> Option<&str> {
        self.common.catalog_region.as_deref()
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.common.environment.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure tests that modify environment variables don't run in parallel
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to temporarily set environment variables for a test
    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new(set: &[(&str, &str)], unset: &[&str]) -> Self {
            let mut saved = Vec::new();
            for (k, v) in set {
                saved.push((k.to_string(), env::var(k).ok()));
                env::set_var(k, v);
            }
            for k in unset {
                saved.push((k.to_string(), env::var(k).ok()));
                env::remove_var(k);
            }
            Self { vars: saved }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (k, v) in self.vars.iter().rev() {
                match v {
                    Some(val) => env::set_var(k, val),
                    None => env::remove_var(k),
                }
            }
        }
    }

    #[test]
    fn test_spotify_credentials_required_in_production() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let _guard = EnvGuard::new(
            &[("ENVIRONMENT", "production")],
            &["SPOTIFY_CLIENT_ID", "SPOTIFY_CLIENT_SECRET"],
        );

        let result = Config::from_env();
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("SPOTIFY_CLIENT_ID"));
        assert!(err.contains("required in production"));
    }

    #[test]
    fn test_development_tolerates_missing_credentials() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let _guard = EnvGuard::new(
            &[("ENVIRONMENT", "development")],
            &["SPOTIFY_CLIENT_ID", "SPOTIFY_CLIENT_SECRET", "PORT", "MAX_UPLOAD_BYTES"],
        );

        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(!config.spotify().has_credentials());
        assert!(!config.is_production());
    }

    #[test]
    fn test_cors_origins_parsed() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let _guard = EnvGuard::new(
            &[("CORS_ORIGINS", "http://localhost:3000, ,https://snapsong.app")],
            &[],
        );

        let config = Config::from_env().unwrap();
        assert_eq!(
            config.cors_allowed_origins,
            Some(vec![
                "http://localhost:3000".to_string(),
                "https://snapsong.app".to_string()
            ])
        );
    }

    #[test]
    fn test_invalid_port_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let _guard = EnvGuard::new(&[("PORT", "not-a-port")], &[]);

        let err = Config::from_env().unwrap_err().to_string();
        assert!(err.contains("Invalid PORT value"));
    }

    #[test]
    fn test_zero_upload_limit_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let _guard = EnvGuard::new(&[("MAX_UPLOAD_BYTES", "0")], &[]);

        assert!(Config::from_env().is_err());
    }
}
