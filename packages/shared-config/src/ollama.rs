//! Ollama vision model configuration types

use crate::{get_env_or_default, parse_env, validate_http_url, ConfigResult};

/// Ollama vision model configuration
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Ollama server URL
    pub url: String,

    /// Multimodal model used to describe images (e.g., llava, llama3.2-vision)
    pub vision_model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum tokens for generation
    pub max_tokens: u32,

    /// Temperature for generation (0.0 - 1.0)
    pub temperature: f32,
}

impl OllamaConfig {
    /// Load Ollama configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        let url = get_env_or_default("OLLAMA_URL", "http://localhost:11434");
        validate_http_url("OLLAMA_URL", &url)?;

        Ok(Self {
            url,
            vision_model: get_env_or_default("OLLAMA_VISION_MODEL", "llava"),
            timeout_secs: parse_env("OLLAMA_TIMEOUT", 120)?,
            max_tokens: parse_env("OLLAMA_MAX_TOKENS", 1024)?,
            temperature: parse_env("OLLAMA_TEMPERATURE", 0.4)?,
        })
    }

    /// Create a configuration with a custom URL (useful for testing)
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Get the full URL for the generation endpoint
    pub fn generate_url(&self) -> String {
        format!("{}/api/generate", self.url.trim_end_matches('/'))
    }

    /// Get the full URL for the model listing endpoint
    pub fn tags_url(&self) -> String {
        format!("{}/api/tags", self.url.trim_end_matches('/'))
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            vision_model: "llava".to_string(),
            timeout_secs: 120,
            max_tokens: 1024,
            temperature: 0.4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OllamaConfig::default();
        assert_eq!(config.url, "http://localhost:11434");
        assert_eq!(config.vision_model, "llava");
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_with_url() {
        let config = OllamaConfig::with_url("http://ollama:11434");
        assert_eq!(config.url, "http://ollama:11434");
        assert_eq!(config.vision_model, "llava");
    }

    #[test]
    fn test_endpoint_urls_with_trailing_slash() {
        let config = OllamaConfig::with_url("http://localhost:11434/");
        assert_eq!(config.generate_url(), "http://localhost:11434/api/generate");
        assert_eq!(config.tags_url(), "http://localhost:11434/api/tags");
    }

    #[test]
    fn test_from_env_rejects_schemeless_url() {
        temp_env::with_var("OLLAMA_URL", Some("ollama:11434"), || {
            assert!(OllamaConfig::from_env().is_err());
        });
    }
}
