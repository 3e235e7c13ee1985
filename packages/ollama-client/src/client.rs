//! Core Ollama HTTP client with retry logic and connection pooling

use std::future::Future;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use snapsong_shared_config::OllamaConfig;
use tracing::{debug, instrument, warn};

use crate::error::{OllamaError, OllamaResult};
use crate::models::{
    GenerateOptions, GenerateRequest, GenerateResponse, ListModelsResponse, ResponseFormat,
};

/// Maximum error body size to prevent memory exhaustion
const MAX_ERROR_BODY_SIZE: usize = 1000;

/// Default retry configuration
const DEFAULT_RETRY_ATTEMPTS: u32 = 2;
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 500;

/// Ollama API client with retry logic and connection pooling
#[derive(Debug, Clone)]
pub struct OllamaClient {
    /// HTTP client with connection pool
    http_client: Client,
    /// Configuration
    config: OllamaConfig,
    /// Number of retry attempts for transient failures
    retry_attempts: u32,
    /// Base delay for exponential backoff (milliseconds)
    retry_base_delay_ms: u64,
}

impl OllamaClient {
    /// Create a new Ollama client from configuration
    pub fn new(config: &OllamaConfig) -> OllamaResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(OllamaError::HttpError)?;

        Ok(Self {
            http_client,
            config: config.clone(),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
        })
    }

    /// Create a client with custom HTTP client (for testing)
    pub fn with_client(config: &OllamaConfig, http_client: Client) -> Self {
        Self {
            http_client,
            config: config.clone(),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
        }
    }

    /// Set retry configuration
    pub fn with_retry_config(mut self, attempts: u32, base_delay_ms: u64) -> Self {
        self.retry_attempts = attempts;
        self.retry_base_delay_ms = base_delay_ms;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Execute an async operation with retry logic
    async fn with_retry<T, F, Fut>(&self, operation: F) -> OllamaResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = OllamaResult<T>>,
    {
        // Zero attempts still runs the operation once
        if self.retry_attempts == 0 {
            return operation().await;
        }

        let mut last_error = None;

        for attempt in 0..self.retry_attempts {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !e.is_retryable() {
                        return Err(e);
                    } else if attempt < self.retry_attempts - 1 {
                        let delay = self.retry_base_delay_ms * 2_u64.pow(attempt);
                        warn!(
                            attempt = attempt + 1,
                            max_attempts = self.retry_attempts,
                            delay_ms = delay,
                            error = %e,
                            "Retrying after transient error"
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        last_error = Some(e);
                    } else {
                        last_error = Some(e);
                        break;
                    }
                }
            }
        }

        Err(OllamaError::RetriesExhausted {
            attempts: self.retry_attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error".to_string()),
        })
    }

    /// Truncate error body to prevent memory exhaustion
    /// Safely handles UTF-8 boundaries to avoid panics on multi-byte characters
    fn truncate_error_body(body: String) -> String {
        if body.len() <= MAX_ERROR_BODY_SIZE {
            return body;
        }

        let truncate_at = body
            .char_indices()
            .map(|(i, _)| i)
            .take_while(|i| *i <= MAX_ERROR_BODY_SIZE)
            .last()
            .unwrap_or(0);

        format!("{}... (truncated)", &body[..truncate_at])
    }

    /// Map a transport error to the matching client error
    fn map_send_error(&self, e: reqwest::Error) -> OllamaError {
        if e.is_connect() {
            OllamaError::ConnectionRefused(self.config.url.clone())
        } else if e.is_timeout() {
            OllamaError::Timeout(self.config.timeout_secs)
        } else {
            OllamaError::HttpError(e)
        }
    }

    /// Check if Ollama is reachable
    pub async fn health_check(&self) -> OllamaResult<bool> {
        match self.http_client.get(self.config.tags_url()).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) if e.is_connect() => {
                Err(OllamaError::ConnectionRefused(self.config.url.clone()))
            }
            Err(e) => Err(OllamaError::HttpError(e)),
        }
    }

    /// List available models
    pub async fn list_models(&self) -> OllamaResult<Vec<String>> {
        let response = self
            .http_client
            .get(self.config.tags_url())
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = Self::truncate_error_body(response.text().await.unwrap_or_default());
            return Err(OllamaError::ApiError(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let list: ListModelsResponse = response.json().await?;
        Ok(list.models.into_iter().map(|m| m.name).collect())
    }

    /// Check if a model is available (tag suffixes such as `:latest` are ignored)
    pub async fn has_model(&self, model: &str) -> OllamaResult<bool> {
        let models = self.list_models().await?;
        let model_base = model.split(':').next().unwrap_or(model);

        Ok(models.iter().any(|m| {
            let m_base = m.split(':').next().unwrap_or(m);
            m_base == model_base
        }))
    }

    /// Internal generation (single request, no retry)
    async fn generate_internal(&self, request: &GenerateRequest) -> OllamaResult<String> {
        let response = self
            .http_client
            .post(self.config.generate_url())
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = Self::truncate_error_body(response.text().await.unwrap_or_default());

            if body.contains("model") && body.contains("not found") {
                return Err(OllamaError::ModelNotFound(self.config.vision_model.clone()));
            }

            return Err(OllamaError::ApiError(format!(
                "Status {}: {}",
                status, body
            )));
        }

        let generate_response: GenerateResponse = response.json().await?;
        if generate_response.response.trim().is_empty() {
            return Err(OllamaError::InvalidResponse(
                "model returned an empty response".to_string(),
            ));
        }

        Ok(generate_response.response)
    }

    /// Generate text about one or more images with the configured vision model
    ///
    /// Images are sent as raw encoded bytes (JPEG/PNG); the client handles the
    /// base64 transport encoding. Pass `ResponseFormat::Json` to constrain the
    /// model to a JSON document.
    #[instrument(skip(self, prompt, images), fields(model = %self.config.vision_model, image_count = images.len()))]
    pub async fn generate_with_images(
        &self,
        prompt: &str,
        images: &[Vec<u8>],
        format: Option<ResponseFormat>,
    ) -> OllamaResult<String> {
        self.generate_with_images_and_options(prompt, images, format, None)
            .await
    }

    /// Generate text about images with custom options and retry logic
    pub async fn generate_with_images_and_options(
        &self,
        prompt: &str,
        images: &[Vec<u8>],
        format: Option<ResponseFormat>,
        options: Option<GenerateOptions>,
    ) -> OllamaResult<String> {
        if images.iter().any(|image| image.is_empty()) {
            return Err(OllamaError::InvalidRequest(
                "image payload cannot be empty".to_string(),
            ));
        }

        let request = GenerateRequest {
            model: self.config.vision_model.clone(),
            prompt: prompt.to_string(),
            images: images.iter().map(|image| BASE64.encode(image)).collect(),
            stream: false,
            format,
            options: options.or_else(|| {
                Some(GenerateOptions {
                    temperature: Some(self.config.temperature),
                    num_predict: Some(self.config.max_tokens),
                    ..Default::default()
                })
            }),
        };

        debug!(
            prompt_len = request.prompt.len(),
            payload_bytes = request.images.iter().map(String::len).sum::<usize>(),
            "Generating from images"
        );

        let result = self
            .with_retry(|| async { self.generate_internal(&request).await })
            .await?;

        debug!(response_len = result.len(), "Vision response received");

        Ok(result)
    }
}
