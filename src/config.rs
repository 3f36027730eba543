//! Configuration management for spotmix.
//!
//! Values are resolved in this order:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::error::{Error, Result};

pub const APP_DIR: &str = "spotmix";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file is optional; variables already present in the environment win.
///
/// - Linux: `~/.local/share/spotmix/.env`
/// - macOS: `~/Library/Application Support/spotmix/.env`
/// - Windows: `%LOCALAPPDATA%/spotmix/.env`
pub async fn load_env() -> Result<()> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    async_fs::create_dir_all(&path).await?;
    path.push(".env");

    if async_fs::metadata(&path).await.is_ok() {
        dotenv::from_path(&path).map_err(|e| Error::Config(e.to_string()))?;
    }
    Ok(())
}

/// Reads and parses `key`, falling back to `default` when unset or malformed.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Address the HTTP API binds to, e.g. `127.0.0.1:8080`.
pub fn server_addr() -> String {
    env_or("SERVER_ADDRESS", "127.0.0.1:8080".to_string())
}

/// Directory holding user records and playlist definitions.
pub fn data_dir() -> PathBuf {
    match env::var("DATA_DIR") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
            path.push(APP_DIR);
            path
        }
    }
}

/// Base URL of the Spotify Web API.
pub fn spotify_apiurl() -> String {
    env_or("SPOTIFY_API_URL", "https://api.spotify.com/v1".to_string())
}

/// Token endpoint used to refresh stored access tokens.
pub fn spotify_apitoken_url() -> String {
    env_or(
        "SPOTIFY_API_TOKEN_URL",
        "https://accounts.spotify.com/api/token".to_string(),
    )
}

/// Client id of the registered Spotify application.
///
/// # Errors
///
/// Returns a configuration error if `SPOTIFY_API_AUTH_CLIENT_ID` is not set.
pub fn spotify_client_id() -> Result<String> {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID")
        .map_err(|_| Error::Config("SPOTIFY_API_AUTH_CLIENT_ID must be set".to_string()))
}

/// Optional client secret. Without it token refreshes use the public client flow.
pub fn spotify_client_secret() -> Option<String> {
    env::var("SPOTIFY_API_AUTH_CLIENT_SECRET")
        .ok()
        .filter(|s| !s.is_empty())
}

/// Size of the worker pool used by run-all.
pub fn run_workers() -> usize {
    env_or("RUN_WORKERS", 4usize).max(1)
}

/// Attempts per provider call before a run is marked failed.
pub fn run_max_attempts() -> u32 {
    env_or("RUN_MAX_ATTEMPTS", 5u32).max(1)
}

pub fn run_backoff_base() -> Duration {
    Duration::from_millis(env_or("RUN_BACKOFF_BASE_MS", 500u64))
}

pub fn run_backoff_cap() -> Duration {
    Duration::from_millis(env_or("RUN_BACKOFF_CAP_MS", 30_000u64))
}

/// Upper bound for a single playlist run; a run exceeding it is cancelled.
pub fn run_timeout() -> Duration {
    Duration::from_secs(env_or("RUN_TIMEOUT_SECS", 300u64))
}

/// Period of the scheduled run-all trigger.
pub fn run_interval() -> Duration {
    Duration::from_secs(env_or("RUN_INTERVAL_MINUTES", 240u64).max(1) * 60)
}

/// Header carrying the authenticated username, set by the fronting proxy.
pub fn user_header() -> String {
    env_or("USER_HEADER", "x-spotmix-user".to_string()).to_lowercase()
}
