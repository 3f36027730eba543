use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    api::{ApiError, ApiResult, AppState, CurrentUser, Message},
    error,
    store::PlaylistChange,
    types::{Playlist, User},
    update::PlaylistUpdate,
};

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

impl NameQuery {
    pub fn required(self) -> ApiResult<String> {
        self.name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ApiError::bad_request("no name requested"))
    }
}

fn update_body(body: Result<Json<PlaylistUpdate>, JsonRejection>) -> ApiResult<PlaylistUpdate> {
    let Json(mut update) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    update.name = update.name.trim().to_string();
    if update.name.is_empty() {
        return Err(ApiError::bad_request("no name provided"));
    }
    Ok(update)
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Value>> {
    let playlists = state.definitions.list(&user.username).await?;
    Ok(Json(json!({ "playlists": playlists })))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<NameQuery>,
) -> ApiResult<Json<Playlist>> {
    let name = query.required()?;
    state
        .definitions
        .get(&user.username, &name)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "no playlist found"))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<PlaylistUpdate>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    let update = update_body(body)?;
    if state
        .definitions
        .get(&user.username, &update.name)
        .await?
        .is_some()
    {
        return Err(ApiError::bad_request("playlist already exists"));
    }

    let mut playlist = update.into_playlist()?;
    if user.spotify_linked && playlist.uri.is_none() {
        match create_destination(&state, &user, &playlist.name).await {
            Ok(uri) => playlist.uri = Some(uri),
            Err(e) => {
                tracing::warn!(user = %user.username, playlist = %playlist.name, error = %e, "could not create destination playlist");
            }
        }
    }
    tracing::info!(user = %user.username, playlist = %playlist.name, "playlist added");
    state.definitions.upsert(&user.username, playlist).await?;
    Ok((StatusCode::CREATED, Message::success("playlist added")))
}

/// Creates the provider playlist a new definition publishes to.
async fn create_destination(state: &AppState, user: &User, name: &str) -> error::Result<String> {
    let provider = state.coordinator.connect(user).await?;
    Ok(provider.create_playlist(name).await?.uri)
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<PlaylistUpdate>, JsonRejection>,
) -> ApiResult<Json<Message>> {
    let update = update_body(body)?;
    let name = update.name.clone();
    let change: PlaylistChange = Box::new(move |playlist| update.apply(playlist));

    match state.definitions.update(&user.username, &name, change).await {
        Ok(true) => {
            tracing::info!(user = %user.username, playlist = %name, "playlist updated");
            Ok(Message::success("playlist updated"))
        }
        Ok(false) => Err(ApiError::bad_request("playlist doesn't exist")),
        Err(e) => {
            tracing::warn!(user = %user.username, playlist = %name, error = %e, "update rejected");
            Err(e.into())
        }
    }
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<NameQuery>,
) -> ApiResult<Json<Message>> {
    let name = query.required()?;
    if !state.definitions.delete(&user.username, &name).await? {
        return Err(ApiError::new(StatusCode::NOT_FOUND, "no playlist found"));
    }
    tracing::info!(user = %user.username, playlist = %name, "playlist deleted");
    Ok(Message::success("playlist deleted"))
}
