use std::sync::Arc;

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config,
    error::{Error, Result, ValidationError},
    store::UserStore,
    types::{Token, User},
};

/// Tokens expiring within this many seconds are refreshed before use.
pub const EXPIRY_MARGIN_SECS: u64 = 240;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Whether `token` is expired, or will be within [`EXPIRY_MARGIN_SECS`], at `now`.
pub fn is_expired(token: &Token, now: u64) -> bool {
    now + EXPIRY_MARGIN_SECS >= token.obtained_at.saturating_add(token.expires_in)
}

/// Exchanges the refresh token of `token` for a fresh access token.
///
/// Spotify may omit the refresh token and scope in the answer; the previous
/// values are kept in that case. When a client secret is configured the
/// request is authenticated with it, otherwise the public client flow is used.
///
/// # Errors
///
/// Fails with a configuration error when no client id is set, with a
/// transient error on 429/5xx answers and with a provider error otherwise.
pub async fn refresh_token(http: &Client, token: &Token) -> Result<Token> {
    let client_id = config::spotify_client_id()?;
    let mut request = http.post(config::spotify_apitoken_url()).form(&[
        ("grant_type", "refresh_token"),
        ("refresh_token", token.refresh_token.as_str()),
        ("client_id", client_id.as_str()),
    ]);
    if let Some(secret) = config::spotify_client_secret() {
        request = request.basic_auth(&client_id, Some(secret));
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::from_status(status, &body, None));
    }

    let fresh: TokenResponse = response.json().await?;
    Ok(Token {
        access_token: fresh.access_token,
        refresh_token: fresh
            .refresh_token
            .unwrap_or_else(|| token.refresh_token.clone()),
        scope: fresh.scope.unwrap_or_else(|| token.scope.clone()),
        expires_in: fresh.expires_in,
        obtained_at: Utc::now().timestamp() as u64,
    })
}

/// Hands out valid access tokens for stored users.
///
/// A refreshed token is written back to the user store so the next run
/// starts from it.
#[derive(Clone)]
pub struct TokenManager {
    users: Arc<dyn UserStore>,
    http: Client,
}

impl TokenManager {
    pub fn new(users: Arc<dyn UserStore>, http: Client) -> Self {
        Self { users, http }
    }

    pub async fn valid_token(&self, user: &User) -> Result<String> {
        let token = user.token.as_ref().ok_or(ValidationError::NotLinked)?;
        let now = Utc::now().timestamp() as u64;
        if !is_expired(token, now) {
            return Ok(token.access_token.clone());
        }

        tracing::debug!(user = %user.username, "access token expired, refreshing");
        let refreshed = refresh_token(&self.http, token).await?;

        let mut stored = self
            .users
            .get_user(&user.username)
            .await?
            .unwrap_or_else(|| user.clone());
        stored.token = Some(refreshed.clone());
        self.users.save_user(stored).await?;

        Ok(refreshed.access_token)
    }
}
