//! # Spotify Integration Module
//!
//! HTTP client for the parts of the Spotify Web API the engine needs. It
//! implements [`Provider`] for a single authenticated user and
//! [`ProviderFactory`] for building such clients from stored users.
//!
//! ## Endpoints
//!
//! - `GET /me/playlists` - the user's playlists, used to resolve part names
//! - `GET /playlists/{id}/tracks` - live track listing of a part
//! - `GET /recommendations` - recommendation sampling
//! - `PUT|POST /playlists/{id}/tracks` - full replace of a destination
//! - `PUT /playlists/{id}` - destination description
//! - `POST /me/playlists` - destination created for a new definition
//! - `GET /me/player/devices`, `PUT /me/player/play` - ad-hoc playback
//! - `POST /api/token` - refresh of a stored access token
//!
//! ## Error Classification
//!
//! Every response passes through [`SpotifyClient::send`]. `429 Too Many
//! Requests` and `5xx` answers become transient errors carrying the
//! `Retry-After` hint, so the run coordinator can back off and retry them.
//! Anything else the API rejects is a permanent provider error.

pub mod auth;
pub mod player;
pub mod playlists;
pub mod recommendations;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, header::RETRY_AFTER};

use crate::{
    config,
    error::{Error, Result, ValidationError},
    provider::{Provider, ProviderFactory},
    store::UserStore,
    types::{Device, ProviderPlaylist, Track, User},
};

pub use auth::TokenManager;

/// Spotify Web API client bound to one access token.
pub struct SpotifyClient {
    http: Client,
    base_url: String,
    token: String,
}

impl SpotifyClient {
    pub fn new(http: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Sends an authenticated request and classifies unsuccessful answers.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text().await.unwrap_or_default();

        tracing::debug!(%status, ?retry_after, "spotify request failed");
        Err(Error::from_status(status, &body, retry_after))
    }
}

#[async_trait]
impl Provider for SpotifyClient {
    async fn user_playlists(&self) -> Result<Vec<ProviderPlaylist>> {
        self.get_user_playlists().await
    }

    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>> {
        self.get_playlist_tracks(playlist_id).await
    }

    async fn recommendations(&self, seed_ids: &[String], limit: u32) -> Result<Vec<Track>> {
        self.get_recommendations(seed_ids, limit).await
    }

    async fn replace_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        self.replace_playlist_tracks(playlist_id, uris).await
    }

    async fn set_description(&self, playlist_id: &str, description: &str) -> Result<()> {
        self.update_playlist_description(playlist_id, description)
            .await
    }

    async fn create_playlist(&self, name: &str) -> Result<ProviderPlaylist> {
        self.create_user_playlist(name).await
    }

    async fn devices(&self) -> Result<Vec<Device>> {
        self.get_devices().await
    }

    async fn play(&self, device_id: Option<&str>, uris: &[String]) -> Result<()> {
        self.start_playback(device_id, uris).await
    }
}

/// Builds [`SpotifyClient`]s for stored users.
pub struct SpotifyFactory {
    http: Client,
    base_url: String,
    tokens: TokenManager,
}

impl SpotifyFactory {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        let http = Client::new();
        Self {
            tokens: TokenManager::new(users, http.clone()),
            base_url: config::spotify_apiurl(),
            http,
        }
    }
}

#[async_trait]
impl ProviderFactory for SpotifyFactory {
    async fn connect(&self, user: &User) -> Result<Arc<dyn Provider>> {
        if !user.spotify_linked {
            return Err(ValidationError::NotLinked.into());
        }
        let token = self.tokens.valid_token(user).await?;
        Ok(Arc::new(SpotifyClient::new(
            self.http.clone(),
            self.base_url.clone(),
            token,
        )))
    }
}
