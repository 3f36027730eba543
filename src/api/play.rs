use std::{collections::BTreeSet, sync::Arc};

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;

use crate::{
    api::{ApiError, ApiResult, AppState, CurrentUser, Message},
    runner::PLAY_TARGET,
    types::{DEFAULT_RECOMMENDATION_SAMPLE, Playlist, PlaylistType},
};

const PLAY_DAY_BOUNDARY: u32 = 10;

/// Body of `POST /api/playlist/play`: an unsaved definition plus a device.
#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    #[serde(default)]
    pub parts: BTreeSet<String>,
    /// Stored definitions to include, same as `playlist_references`.
    #[serde(default)]
    pub playlists: BTreeSet<String>,
    #[serde(default)]
    pub playlist_type: PlaylistType,
    #[serde(default)]
    pub shuffle: bool,
    #[serde(default = "default_include_recommendations")]
    pub include_recommendations: bool,
    #[serde(default = "default_recommendation_sample")]
    pub recommendation_sample: u32,
    #[serde(default = "default_day_boundary")]
    pub day_boundary: u32,
    #[serde(default)]
    pub add_last_month: bool,
    #[serde(default)]
    pub device_name: Option<String>,
}

fn default_include_recommendations() -> bool {
    true
}

fn default_recommendation_sample() -> u32 {
    DEFAULT_RECOMMENDATION_SAMPLE
}

fn default_day_boundary() -> u32 {
    PLAY_DAY_BOUNDARY
}

impl PlayRequest {
    pub fn into_playlist(self) -> Playlist {
        let mut playlist = Playlist::new(PLAY_TARGET, self.playlist_type);
        playlist.parts = self.parts;
        playlist.playlist_references = self.playlists;
        playlist.shuffle = self.shuffle;
        playlist.include_recommendations = self.include_recommendations;
        playlist.recommendation_sample = self.recommendation_sample;
        playlist.day_boundary = self.day_boundary;
        playlist.add_last_month = self.add_last_month;
        playlist
    }
}

/// `POST /api/playlist/play` - resolves the body like a run and plays the
/// result. Returns once playback is requested.
pub async fn play(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<PlayRequest>, JsonRejection>,
) -> ApiResult<Json<Message>> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let device_name = request
        .device_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    let playlist = request.into_playlist();
    if !playlist.has_sources() {
        tracing::warn!(user = %user.username, "play requested without sources");
        return Err(ApiError::bad_request("insufficient playlist sources"));
    }
    state.coordinator.runnable_user(&user.username).await?;

    tracing::info!(user = %user.username, "playing");
    let coordinator = Arc::clone(&state.coordinator);
    tokio::spawn(async move {
        if let Err(e) = coordinator
            .play(&user.username, playlist, device_name.as_deref())
            .await
        {
            tracing::warn!(user = %user.username, error = %e, "playback failed");
        }
    });
    Ok(Message::success("execution requested"))
}
