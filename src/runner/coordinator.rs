use std::{collections::HashMap, fmt, sync::Arc, time::Duration};

use chrono::Utc;
use tokio::sync::Semaphore;

use crate::{
    config, engine,
    error::{Error, Result, ValidationError},
    provider::{Provider, ProviderFactory},
    runner::{
        lock::{RunGuard, RunLocks},
        retry::{RetryPolicy, Retrying},
    },
    store::{DefinitionStore, UserStore},
    types::{LastRun, Playlist, User},
};

/// Name the ad-hoc definition of [`Coordinator::play`] is resolved under.
/// It shadows a stored definition of the same name for that call only.
pub const PLAY_TARGET: &str = "now playing";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Playlists running in parallel during a run-all.
    pub workers: usize,
    pub retry: RetryPolicy,
    /// Budget for a single playlist run.
    pub timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(300),
        }
    }
}

impl RunnerConfig {
    pub fn from_env() -> Self {
        Self {
            workers: config::run_workers(),
            retry: RetryPolicy::from_env(),
            timeout: config::run_timeout(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    NotFound,
    Cancelled,
    RunFailed,
}

impl FailureKind {
    pub fn of(err: &Error) -> Self {
        match err {
            Error::Validation(_) => Self::Validation,
            Error::NotFound { .. } => Self::NotFound,
            Error::Cancelled { .. } => Self::Cancelled,
            _ => Self::RunFailed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded { tracks: usize },
    Failed { kind: FailureKind, reason: String },
    /// Never started, e.g. because a run of the same playlist was in flight.
    Rejected { reason: String },
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded { tracks } => write!(f, "published {tracks} tracks"),
            Self::Failed { kind, reason } => write!(f, "failed ({kind:?}): {reason}"),
            Self::Rejected { reason } => write!(f, "rejected: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub playlist: String,
    pub outcome: RunOutcome,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RunOutcome::Succeeded { .. })
    }
}

#[derive(Debug, Clone)]
pub struct UserRunSummary {
    pub username: String,
    pub reports: Vec<RunReport>,
}

/// Terminal form of a run error. Validation, not-found and cancellation keep
/// their kind; everything else becomes [`Error::RunFailed`].
fn demote(playlist: &str, err: Error) -> Error {
    match err {
        err @ (Error::Validation(_)
        | Error::NotFound { .. }
        | Error::Cancelled { .. }
        | Error::RunFailed { .. }) => err,
        other => Error::RunFailed {
            playlist: playlist.to_string(),
            reason: other.to_string(),
        },
    }
}

/// Drives playlist runs.
///
/// Owns the per-playlist run locks; every entry point acquires the lock
/// before anything else and records `last_run` exactly once per started run.
pub struct Coordinator {
    definitions: Arc<dyn DefinitionStore>,
    users: Arc<dyn UserStore>,
    providers: Arc<dyn ProviderFactory>,
    locks: RunLocks,
    config: RunnerConfig,
}

impl Coordinator {
    pub fn new(
        definitions: Arc<dyn DefinitionStore>,
        users: Arc<dyn UserStore>,
        providers: Arc<dyn ProviderFactory>,
        config: RunnerConfig,
    ) -> Self {
        Self {
            definitions,
            users,
            providers,
            locks: RunLocks::new(),
            config,
        }
    }

    pub fn locks(&self) -> &RunLocks {
        &self.locks
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Loads a user that is allowed to run playlists.
    pub async fn runnable_user(&self, username: &str) -> Result<User> {
        let user = self
            .users
            .get_user(username)
            .await?
            .ok_or_else(|| Error::not_found("user", username))?;
        if !user.spotify_linked {
            return Err(ValidationError::NotLinked.into());
        }
        Ok(user)
    }

    /// Checks everything that can be checked without the provider, then
    /// takes the run lock.
    async fn prepare(&self, username: &str, name: &str) -> Result<(User, RunGuard)> {
        let user = self.runnable_user(username).await?;
        let playlist = self
            .definitions
            .get(username, name)
            .await?
            .ok_or_else(|| Error::not_found("playlist", name))?;
        engine::publish::destination(&playlist)?;

        let guard = self.locks.try_acquire(username, name)?;
        Ok((user, guard))
    }

    /// Runs one playlist to completion.
    ///
    /// # Errors
    ///
    /// Rejections (unknown user or playlist, unlinked account, missing
    /// destination, run already in flight) return before `last_run` is touched.
    /// Failures of a started run are recorded and returned.
    pub async fn run_playlist(&self, username: &str, name: &str) -> Result<usize> {
        let (user, guard) = self.prepare(username, name).await?;
        self.execute(&user, name, guard).await
    }

    /// Takes the run lock and starts the run in the background.
    ///
    /// Returns once the run is enqueued; the outcome lands in `last_run`.
    pub async fn enqueue(self: &Arc<Self>, username: &str, name: &str) -> Result<()> {
        let (user, guard) = self.prepare(username, name).await?;
        let this = Arc::clone(self);
        let name = name.to_string();
        tokio::spawn(async move {
            if let Err(e) = this.execute(&user, &name, guard).await {
                tracing::warn!(user = %user.username, playlist = %name, error = %e, "background run failed");
            }
        });
        Ok(())
    }

    async fn execute(&self, user: &User, name: &str, guard: RunGuard) -> Result<usize> {
        tracing::info!(user = %user.username, playlist = name, "run started");

        let result = match tokio::time::timeout(self.config.timeout, self.attempt(user, name)).await
        {
            Ok(result) => result.map_err(|e| demote(name, e)),
            Err(_) => Err(Error::Cancelled {
                playlist: name.to_string(),
                after: self.config.timeout,
            }),
        };

        let record = match &result {
            Ok(tracks) => LastRun::success(Utc::now(), *tracks),
            Err(e) => LastRun::failed(Utc::now(), e.to_string()),
        };
        if let Err(e) = self
            .definitions
            .record_run(&user.username, name, record)
            .await
        {
            tracing::warn!(playlist = name, error = %e, "could not record run outcome");
        }
        drop(guard);

        match &result {
            Ok(tracks) => tracing::info!(user = %user.username, playlist = name, tracks, "run succeeded"),
            Err(e) => tracing::warn!(user = %user.username, playlist = name, error = %e, "run failed"),
        }
        result
    }

    /// Provider for `user` whose calls are retried with the configured policy.
    pub async fn connect(&self, user: &User) -> Result<Arc<dyn Provider>> {
        let provider = self
            .config
            .retry
            .run("connect", || self.providers.connect(user))
            .await?;
        Ok(Arc::new(Retrying::new(provider, self.config.retry)))
    }

    async fn definitions_of(&self, username: &str) -> Result<HashMap<String, Playlist>> {
        Ok(self
            .definitions
            .list(username)
            .await?
            .into_iter()
            .map(|playlist| (playlist.name.clone(), playlist))
            .collect())
    }

    async fn attempt(&self, user: &User, name: &str) -> Result<usize> {
        let provider = self.connect(user).await?;
        let definitions = self.definitions_of(&user.username).await?;
        engine::execute(provider.as_ref(), &definitions, name, Utc::now().date_naive()).await
    }

    /// Resolves an unsaved definition against the user's stored ones and
    /// starts playback of the result instead of publishing it.
    ///
    /// Nothing is stored and no run lock is taken. With `device_name` set the
    /// device must exist; otherwise the active device plays.
    pub async fn play(
        &self,
        username: &str,
        mut playlist: Playlist,
        device_name: Option<&str>,
    ) -> Result<usize> {
        let user = self.runnable_user(username).await?;
        playlist.name = PLAY_TARGET.to_string();

        let provider = self.connect(&user).await?;
        let mut definitions = self.definitions_of(username).await?;
        definitions.insert(playlist.name.clone(), playlist);

        let run = async {
            let tracks =
                engine::build(provider.as_ref(), &definitions, PLAY_TARGET, Utc::now().date_naive())
                    .await?;

            let device_id = match device_name {
                Some(device_name) => {
                    let device = provider
                        .devices()
                        .await?
                        .into_iter()
                        .find(|d| d.name == device_name)
                        .ok_or_else(|| Error::not_found("device", device_name))?;
                    device.id
                }
                None => None,
            };

            let uris: Vec<String> = tracks.into_iter().map(|t| t.uri).collect();
            provider.play(device_id.as_deref(), &uris).await?;
            Ok::<_, Error>(uris.len())
        };

        match tokio::time::timeout(self.config.timeout, run).await {
            Ok(result) => {
                if let Ok(tracks) = &result {
                    tracing::info!(user = username, tracks, device = ?device_name, "playback started");
                }
                result
            }
            Err(_) => Err(Error::Cancelled {
                playlist: PLAY_TARGET.to_string(),
                after: self.config.timeout,
            }),
        }
    }

    async fn run_one(&self, user: &User, name: &str) -> RunOutcome {
        let guard = match self.locks.try_acquire(&user.username, name) {
            Ok(guard) => guard,
            Err(e) => {
                return RunOutcome::Rejected {
                    reason: e.to_string(),
                };
            }
        };
        match self.execute(user, name, guard).await {
            Ok(tracks) => RunOutcome::Succeeded { tracks },
            Err(e) => RunOutcome::Failed {
                kind: FailureKind::of(&e),
                reason: e.to_string(),
            },
        }
    }

    /// Runs every playlist of `username` that has sources and a destination.
    ///
    /// At most `workers` playlists run at once. A failing playlist never
    /// stops its siblings; each gets its own [`RunReport`], in name order.
    pub async fn run_all(self: &Arc<Self>, username: &str) -> Result<Vec<RunReport>> {
        let user = self.runnable_user(username).await?;
        let playlists = self.definitions.list(username).await?;

        let semaphore = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let mut handles = Vec::new();
        for playlist in playlists {
            if !playlist.has_sources() || engine::publish::destination(&playlist).is_err() {
                tracing::debug!(playlist = %playlist.name, "no sources or destination, skipping");
                continue;
            }

            let this = Arc::clone(self);
            let semaphore = Arc::clone(&semaphore);
            let user = user.clone();
            let name = playlist.name.clone();
            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return RunOutcome::Rejected {
                        reason: "worker pool closed".to_string(),
                    };
                };
                this.run_one(&user, &name).await
            });
            handles.push((playlist.name, handle));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for (playlist, handle) in handles {
            let outcome = handle.await.unwrap_or_else(|e| RunOutcome::Failed {
                kind: FailureKind::RunFailed,
                reason: e.to_string(),
            });
            reports.push(RunReport { playlist, outcome });
        }

        let failed = reports.iter().filter(|r| !r.is_success()).count();
        tracing::info!(user = username, total = reports.len(), failed, "run-all finished");
        Ok(reports)
    }

    /// Run-all for every linked, unlocked user. A user whose run-all cannot
    /// start is logged and skipped.
    pub async fn run_all_users(self: &Arc<Self>) -> Result<Vec<UserRunSummary>> {
        let mut summaries = Vec::new();
        for user in self.users.list_users().await? {
            if !user.spotify_linked || user.locked {
                tracing::debug!(user = %user.username, "not runnable, skipping");
                continue;
            }
            match self.run_all(&user.username).await {
                Ok(reports) => summaries.push(UserRunSummary {
                    username: user.username,
                    reports,
                }),
                Err(e) => tracing::warn!(user = %user.username, error = %e, "run-all failed"),
            }
        }
        Ok(summaries)
    }
}
