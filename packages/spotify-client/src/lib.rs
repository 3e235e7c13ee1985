//! Spotify Web API client for Snapsong
//!
//! This crate provides a catalog search client using the client-credentials
//! flow. Access tokens are cached and refreshed shortly before they expire;
//! a token rejected mid-flight is discarded and the request is re-sent once.
//!
//! # Example
//!
//! ```rust,no_run
//! use snapsong_shared_config::SpotifyConfig;
//! use snapsong_spotify_client::SpotifyClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SpotifyClient::new(&SpotifyConfig::from_env()?)?;
//!
//! for track in client.search_tracks("rainy day jazz", 10).await? {
//!     println!("{:?} by {}", track.name, track.artist_names());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Environment Variables
//!
//! - `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET`: application credentials (required)
//! - `SPOTIFY_MARKET`: optional market code applied to every search

mod client;
mod error;
mod models;

pub use client::SpotifyClient;
pub use error::{SpotifyError, SpotifyResult};
pub use models::{Album, Artist, ExternalUrls, Image, Track};
