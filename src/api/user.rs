use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    api::{ApiError, ApiResult, AppState, CurrentUser, Message, require_admin},
    types::UserInfo,
};

/// Admin changes to an account.
#[derive(Debug, Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub locked: Option<bool>,
    /// Only `false` has an effect: it unlinks the account.
    pub spotify_linked: Option<bool>,
}

pub async fn get(CurrentUser(user): CurrentUser) -> Json<UserInfo> {
    Json(UserInfo::from(&user))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<UserUpdate>, JsonRejection>,
) -> ApiResult<Json<Message>> {
    require_admin(&user)?;
    let Json(update) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let username = update.username.unwrap_or_else(|| user.username.clone());
    let Some(mut account) = state.users.get_user(&username).await? else {
        return Err(ApiError::bad_request("non-existent user"));
    };

    let mut changed = false;
    if let Some(locked) = update.locked {
        tracing::info!(user = %username, locked, "updating lock");
        account.locked = locked;
        changed = true;
    }
    if update.spotify_linked == Some(false) {
        tracing::info!(user = %username, "unlinking spotify account");
        account.spotify_linked = false;
        account.token = None;
        changed = true;
    }
    if !changed {
        return Err(ApiError::bad_request("no changes to make"));
    }

    state.users.save_user(account).await?;
    Ok(Message::success("account updated"))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Value>> {
    require_admin(&user)?;
    let accounts: Vec<UserInfo> = state
        .users
        .list_users()
        .await?
        .iter()
        .map(UserInfo::from)
        .collect();
    Ok(Json(json!({ "accounts": accounts })))
}
