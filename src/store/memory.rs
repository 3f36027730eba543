use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::{Error, Result},
    store::{DefinitionStore, PlaylistChange, UserStore},
    types::{LastRun, Playlist, User},
};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    playlists: RwLock<HashMap<String, BTreeMap<String, Playlist>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_user(self, user: User) -> Self {
        self.users.write().await.insert(user.username.clone(), user);
        self
    }

    pub async fn with_playlist(self, user: &str, playlist: Playlist) -> Self {
        self.playlists
            .write()
            .await
            .entry(user.to_string())
            .or_default()
            .insert(playlist.name.clone(), playlist);
        self
    }
}

#[async_trait]
impl DefinitionStore for MemoryStore {
    async fn list(&self, user: &str) -> Result<Vec<Playlist>> {
        Ok(self
            .playlists
            .read()
            .await
            .get(user)
            .map(|p| p.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get(&self, user: &str, name: &str) -> Result<Option<Playlist>> {
        Ok(self
            .playlists
            .read()
            .await
            .get(user)
            .and_then(|p| p.get(name).cloned()))
    }

    async fn upsert(&self, user: &str, playlist: Playlist) -> Result<()> {
        self.playlists
            .write()
            .await
            .entry(user.to_string())
            .or_default()
            .insert(playlist.name.clone(), playlist);
        Ok(())
    }

    async fn update(&self, user: &str, name: &str, change: PlaylistChange) -> Result<bool> {
        let mut playlists = self.playlists.write().await;
        let Some(stored) = playlists.get_mut(user).and_then(|p| p.get_mut(name)) else {
            return Ok(false);
        };
        let mut edited = stored.clone();
        change(&mut edited)?;
        *stored = edited;
        Ok(true)
    }

    async fn delete(&self, user: &str, name: &str) -> Result<bool> {
        Ok(self
            .playlists
            .write()
            .await
            .get_mut(user)
            .and_then(|p| p.remove(name))
            .is_some())
    }

    async fn record_run(&self, user: &str, name: &str, run: LastRun) -> Result<()> {
        let mut playlists = self.playlists.write().await;
        let playlist = playlists
            .get_mut(user)
            .and_then(|p| p.get_mut(name))
            .ok_or_else(|| Error::not_found("playlist", name))?;
        playlist.last_run = run;
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn save_user(&self, user: User) -> Result<()> {
        self.users.write().await.insert(user.username.clone(), user);
        Ok(())
    }
}
