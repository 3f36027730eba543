use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{
    config,
    error::Result,
    provider::Provider,
    types::{Device, ProviderPlaylist, Track},
};

/// `Retry-After` hints above this are not waited out.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(120);

/// Exponential backoff for transient provider failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn from_env() -> Self {
        Self {
            max_attempts: config::run_max_attempts(),
            base_delay: config::run_backoff_base(),
            max_delay: config::run_backoff_cap(),
        }
    }

    /// Delay before the attempt following failed attempt number `attempt`.
    ///
    /// `base * 2^(attempt - 1)`, capped at `max_delay`, but never shorter than
    /// the provider's `hint`.
    pub fn delay_for(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        let backoff = self.base_delay.saturating_mul(factor).min(self.max_delay);
        match hint {
            Some(hint) => backoff.max(hint),
            None => backoff,
        }
    }

    /// Runs `operation` until it succeeds, fails permanently or runs out of
    /// attempts. Only transient errors are retried.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() || attempt >= self.max_attempts {
                return Err(err);
            }
            if let Some(hint) = err.retry_after() {
                if hint > MAX_RETRY_AFTER {
                    tracing::warn!(
                        operation = label,
                        retry_after = hint.as_secs(),
                        "retry-after is abnormally high, giving up"
                    );
                    return Err(err);
                }
            }

            let delay = self.delay_for(attempt, err.retry_after());
            tracing::warn!(
                operation = label,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "transient provider error, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// [`Provider`] that retries every call of the wrapped provider.
///
/// `replace_tracks` is retried as a whole, so a failed publish starts over
/// with the replacing write.
pub struct Retrying {
    inner: Arc<dyn Provider>,
    policy: RetryPolicy,
}

impl Retrying {
    pub fn new(inner: Arc<dyn Provider>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl Provider for Retrying {
    async fn user_playlists(&self) -> Result<Vec<ProviderPlaylist>> {
        self.policy
            .run("user_playlists", || self.inner.user_playlists())
            .await
    }

    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>> {
        self.policy
            .run("playlist_tracks", || self.inner.playlist_tracks(playlist_id))
            .await
    }

    async fn recommendations(&self, seed_ids: &[String], limit: u32) -> Result<Vec<Track>> {
        self.policy
            .run("recommendations", || self.inner.recommendations(seed_ids, limit))
            .await
    }

    async fn replace_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        self.policy
            .run("replace_tracks", || self.inner.replace_tracks(playlist_id, uris))
            .await
    }

    async fn set_description(&self, playlist_id: &str, description: &str) -> Result<()> {
        self.policy
            .run("set_description", || {
                self.inner.set_description(playlist_id, description)
            })
            .await
    }

    /// Not retried: a repeated create would leave a second playlist behind.
    async fn create_playlist(&self, name: &str) -> Result<ProviderPlaylist> {
        self.inner.create_playlist(name).await
    }

    async fn devices(&self) -> Result<Vec<Device>> {
        self.policy.run("devices", || self.inner.devices()).await
    }

    async fn play(&self, device_id: Option<&str>, uris: &[String]) -> Result<()> {
        self.policy
            .run("play", || self.inner.play(device_id, uris))
            .await
    }
}
