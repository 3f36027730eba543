use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{
    api::{ApiResult, AppState, CurrentUser, Message, playlist::NameQuery, require_admin},
    runner::Coordinator,
};

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: Option<String>,
}

/// `GET /api/playlist/run?name=` - starts a run and returns once it is enqueued.
pub async fn run_playlist(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<NameQuery>,
) -> ApiResult<Json<Message>> {
    let name = query.required()?;
    state.coordinator.enqueue(&user.username, &name).await?;
    tracing::info!(user = %user.username, playlist = %name, "run requested");
    Ok(Message::success("execution requested"))
}

/// `GET /api/playlist/run/user` - run-all for the caller, or for `?username=`
/// when the caller is an admin.
pub async fn run_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<UsernameQuery>,
) -> ApiResult<Json<Message>> {
    let target = match query.username.filter(|u| !u.trim().is_empty()) {
        Some(username) if user.is_admin() => username,
        _ => user.username.clone(),
    };

    // surface "not linked" and unknown users to the caller before going async
    state.coordinator.runnable_user(&target).await?;

    let coordinator = Arc::clone(&state.coordinator);
    tokio::spawn(async move {
        if let Err(e) = coordinator.run_all(&target).await {
            tracing::warn!(user = %target, error = %e, "run-all failed");
        }
    });
    Ok(Message::success("execution requested"))
}

/// `GET /api/playlist/run/users` - admin only, run-all for every runnable user.
pub async fn run_users(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Message>> {
    require_admin(&user)?;

    let coordinator: Arc<Coordinator> = Arc::clone(&state.coordinator);
    tokio::spawn(async move {
        if let Err(e) = coordinator.run_all_users().await {
            tracing::warn!(error = %e, "run-all for all users failed");
        }
    });
    Ok(Message::success("execution requested"))
}
