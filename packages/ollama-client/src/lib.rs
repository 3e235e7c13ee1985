//! Ollama vision client for Snapsong image analysis
//!
//! This crate wraps the Ollama `/api/generate` endpoint for multimodal
//! models: images are attached as base64 payloads and the model answers
//! with free text or, when requested, a JSON document.
//!
//! # Requirements
//!
//! - Ollama must be running and accessible at the configured URL
//! - A vision-capable model must be pulled before use:
//!   ```bash
//!   ollama pull llava
//!   ```
//!
//! # Thread Safety
//!
//! `OllamaClient` is `Clone + Send + Sync` and can be safely shared
//! across request handlers. It uses a shared HTTP client connection pool.
//!
//! # Example
//!
//! ```no_run
//! use snapsong_ollama_client::{OllamaClient, ResponseFormat};
//! use snapsong_shared_config::OllamaConfig;
//!
//! # async fn example(photo: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new(&OllamaConfig::default())?;
//!
//! let description = client
//!     .generate_with_images("Describe this photo.", &[photo.clone()], None)
//!     .await?;
//! println!("{}", description);
//!
//! let attributes = client
//!     .generate_with_images("Return scene and mood as JSON.", &[photo], Some(ResponseFormat::Json))
//!     .await?;
//! println!("{}", attributes);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod models;

pub use client::OllamaClient;
pub use error::{OllamaError, OllamaResult};
pub use models::{
    GenerateOptions, GenerateRequest, GenerateResponse, ListModelsResponse, ModelInfo,
    ResponseFormat,
};
