//! Mock Ollama server for testing vision generation
//!
//! Provides a [`MockOllamaServer`] that simulates the Ollama API endpoints
//! used for image description and attribute analysis.

use serde_json::json;
use snapsong_shared_config::OllamaConfig;
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches generate requests by whether they ask for `"format": "json"`
///
/// Description prompts are free text, attribute prompts request JSON, so
/// this is what tells the two calls of one analysis apart.
struct JsonFormat(bool);

impl Match for JsonFormat {
    fn matches(&self, request: &Request) -> bool {
        let wants_json = serde_json::from_slice::<serde_json::Value>(&request.body)
            .map(|body| body.get("format").and_then(|f| f.as_str()) == Some("json"))
            .unwrap_or(false);
        wants_json == self.0
    }
}

/// Mock Ollama server for testing vision requests
///
/// # Example
///
/// ```rust,ignore
/// use snapsong_test_utils::MockOllamaServer;
///
/// #[tokio::test]
/// async fn test_describe() {
///     let server = MockOllamaServer::start().await;
///     server.mock_describe("**Description:** A beach").await;
///     server.mock_attributes("beach", "calm", "peaceful", "blue").await;
///
///     let config = server.config();
///     // ... build an OllamaClient from config
/// }
/// ```
pub struct MockOllamaServer {
    server: MockServer,
}

impl MockOllamaServer {
    /// Start a new mock Ollama server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Get the server URL
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Client configuration pointing at this server
    pub fn config(&self) -> OllamaConfig {
        OllamaConfig {
            timeout_secs: 5,
            ..OllamaConfig::with_url(self.url())
        }
    }

    /// Mount a free-text response for description prompts
    pub async fn mock_describe(&self, response_text: &str) {
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(JsonFormat(false))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llava",
                "response": response_text,
                "done": true
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a JSON attribute response for attribute prompts
    pub async fn mock_attributes(&self, scene: &str, mood: &str, emotion: &str, color: &str) {
        let attributes = json!({
            "scene": scene,
            "mood": mood,
            "emotion": emotion,
            "dominant_color": color
        });
        self.mock_attributes_raw(&attributes.to_string()).await;
    }

    /// Mount an attribute response with arbitrary model text
    pub async fn mock_attributes_raw(&self, response_text: &str) {
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(JsonFormat(true))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llava",
                "response": response_text,
                "done": true
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a failure for every generate request
    pub async fn mock_generate_failure(&self, status_code: u16, error_message: &str) {
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(status_code).set_body_json(json!({
                "error": error_message
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for the /api/tags endpoint (list models)
    pub async fn mock_list_models(&self, models: &[&str]) {
        let model_list: Vec<serde_json::Value> = models
            .iter()
            .map(|name| {
                json!({
                    "name": name,
                    "modified_at": "2024-01-01T00:00:00Z",
                    "size": 4_000_000_000_i64
                })
            })
            .collect();

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "models": model_list
            })))
            .mount(&self.server)
            .await;
    }

    /// Number of generate requests received so far
    pub async fn generate_calls(&self) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == "/api/generate")
            .count()
    }

    /// Get reference to the underlying mock server for custom mock setups
    pub fn inner(&self) -> &MockServer {
        &self.server
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_ollama_server_starts() {
        let server = MockOllamaServer::start().await;
        assert!(server.url().starts_with("http://"));
        assert_eq!(server.config().url, server.url());
    }

    #[tokio::test]
    async fn test_describe_and_attributes_are_routed_by_format() {
        let server = MockOllamaServer::start().await;
        server.mock_describe("**Description:** A forest").await;
        server.mock_attributes("forest", "calm", "peaceful", "green").await;

        let client = reqwest::Client::new();

        let describe: serde_json::Value = client
            .post(format!("{}/api/generate", server.url()))
            .json(&json!({"model": "llava", "prompt": "describe", "stream": false}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(describe["response"], "**Description:** A forest");

        let attributes: serde_json::Value = client
            .post(format!("{}/api/generate", server.url()))
            .json(&json!({"model": "llava", "prompt": "attrs", "stream": false, "format": "json"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let parsed: serde_json::Value =
            serde_json::from_str(attributes["response"].as_str().unwrap()).unwrap();
        assert_eq!(parsed["scene"], "forest");

        assert_eq!(server.generate_calls().await, 2);
    }

    #[tokio::test]
    async fn test_mock_ollama_list_models() {
        let server = MockOllamaServer::start().await;
        server.mock_list_models(&["llava", "llama3.2-vision"]).await;

        let body: serde_json::Value = reqwest::get(format!("{}/api/tags", server.url()))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["models"].as_array().unwrap().len(), 2);
    }
}
