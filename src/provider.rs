//! The streaming provider as seen by the engine.
//!
//! Everything the engine needs from the catalog goes through [`Provider`]:
//! listing the user's playlists, reading their tracks, asking for
//! recommendations, replacing a destination playlist and starting playback. The Spotify
//! implementation lives in [`crate::spotify`]; tests plug in their own.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::Result,
    types::{Device, ProviderPlaylist, Track, User},
};

/// Catalog operations for one authenticated user.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Every playlist the user owns or follows.
    async fn user_playlists(&self) -> Result<Vec<ProviderPlaylist>>;

    /// Current tracks of a provider playlist. Tracks without an id are dropped.
    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>>;

    /// Up to `limit` tracks recommended from `seed_ids`.
    ///
    /// Implementations may sample the seeds down to what the catalog accepts.
    async fn recommendations(&self, seed_ids: &[String], limit: u32) -> Result<Vec<Track>>;

    /// Replaces the whole content of `playlist_id` with `uris`.
    ///
    /// Calling it twice with the same input leaves the playlist unchanged.
    async fn replace_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()>;

    async fn set_description(&self, playlist_id: &str, description: &str) -> Result<()>;

    /// Creates an empty private playlist named `name` in the user's library.
    async fn create_playlist(&self, name: &str) -> Result<ProviderPlaylist>;

    async fn devices(&self) -> Result<Vec<Device>>;

    /// Starts playback of `uris`, on `device_id` or the active device.
    async fn play(&self, device_id: Option<&str>, uris: &[String]) -> Result<()>;
}

/// Builds a [`Provider`] for a stored user, refreshing credentials as needed.
#[async_trait]
pub trait ProviderFactory: Send + Sync {
    async fn connect(&self, user: &User) -> Result<Arc<dyn Provider>>;
}
