//! Persistence of playlist definitions and user records.
//!
//! The engine only talks to the [`DefinitionStore`] and [`UserStore`] traits.
//! [`JsonStore`] keeps one directory per user under the data directory,
//! [`MemoryStore`] backs tests and one-off runs.

mod json;
mod memory;

use async_trait::async_trait;

use crate::{
    error::Result,
    types::{LastRun, Playlist, User},
};

pub use json::JsonStore;
pub use memory::MemoryStore;

/// Edit applied to a stored definition by [`DefinitionStore::update`].
pub type PlaylistChange = Box<dyn FnOnce(&mut Playlist) -> Result<()> + Send>;

/// Playlist definitions, keyed by name inside each user's namespace.
#[async_trait]
pub trait DefinitionStore: Send + Sync {
    async fn list(&self, user: &str) -> Result<Vec<Playlist>>;

    async fn get(&self, user: &str, name: &str) -> Result<Option<Playlist>>;

    /// Inserts or replaces the definition named `playlist.name`.
    async fn upsert(&self, user: &str, playlist: Playlist) -> Result<()>;

    /// Applies `change` to the stored definition in one read-modify-write
    /// cycle, so a concurrent [`record_run`](Self::record_run) is never lost.
    ///
    /// Returns `false` when nothing is stored under `name`. When `change`
    /// fails nothing is written and its error is returned.
    async fn update(&self, user: &str, name: &str, change: PlaylistChange) -> Result<bool>;

    /// Returns `false` when nothing was stored under `name`.
    async fn delete(&self, user: &str, name: &str) -> Result<bool>;

    /// Writes `last_run` only, leaving every other field as stored.
    async fn record_run(&self, user: &str, name: &str, run: LastRun) -> Result<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, username: &str) -> Result<Option<User>>;

    async fn list_users(&self) -> Result<Vec<User>>;

    async fn save_user(&self, user: User) -> Result<()>;
}
