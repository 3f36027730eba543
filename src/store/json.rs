use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;

use crate::{
    error::{Error, Result},
    store::{DefinitionStore, PlaylistChange, UserStore},
    types::{LastRun, Playlist, User},
};

const USERS_DIR: &str = "users";
const USER_FILE: &str = "user.json";
const PLAYLISTS_FILE: &str = "playlists.json";

/// File-backed store.
///
/// Layout: `<root>/users/<username>/user.json` and
/// `<root>/users/<username>/playlists.json`.
pub struct JsonStore {
    root: PathBuf,
    // serializes read-modify-write cycles on the files
    write_lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn user_dir(&self, username: &str) -> Result<PathBuf> {
        if username.is_empty()
            || username.starts_with('.')
            || username.contains(['/', '\\'])
        {
            return Err(Error::invalid_input(format!("invalid username {username:?}")));
        }
        let mut path = self.root.clone();
        path.push(USERS_DIR);
        path.push(username);
        Ok(path)
    }

    async fn load<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
        match async_fs::read_to_string(path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(value)?;
        // write then rename so readers never see a half-written file
        let tmp = path.with_extension("json.tmp");
        async_fs::write(&tmp, json).await?;
        async_fs::rename(&tmp, path).await?;
        Ok(())
    }

    async fn load_playlists(&self, user: &str) -> Result<BTreeMap<String, Playlist>> {
        let path = self.user_dir(user)?.join(PLAYLISTS_FILE);
        Self::load(&path).await
    }

    async fn persist_playlists(
        &self,
        user: &str,
        playlists: &BTreeMap<String, Playlist>,
    ) -> Result<()> {
        let path = self.user_dir(user)?.join(PLAYLISTS_FILE);
        Self::persist(&path, playlists).await
    }
}

#[async_trait]
impl DefinitionStore for JsonStore {
    async fn list(&self, user: &str) -> Result<Vec<Playlist>> {
        Ok(self.load_playlists(user).await?.into_values().collect())
    }

    async fn get(&self, user: &str, name: &str) -> Result<Option<Playlist>> {
        Ok(self.load_playlists(user).await?.remove(name))
    }

    async fn upsert(&self, user: &str, playlist: Playlist) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut playlists = self.load_playlists(user).await?;
        playlists.insert(playlist.name.clone(), playlist);
        self.persist_playlists(user, &playlists).await
    }

    async fn update(&self, user: &str, name: &str, change: PlaylistChange) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut playlists = self.load_playlists(user).await?;
        let Some(playlist) = playlists.get_mut(name) else {
            return Ok(false);
        };
        change(playlist)?;
        self.persist_playlists(user, &playlists).await?;
        Ok(true)
    }

    async fn delete(&self, user: &str, name: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut playlists = self.load_playlists(user).await?;
        if playlists.remove(name).is_none() {
            return Ok(false);
        }
        self.persist_playlists(user, &playlists).await?;
        Ok(true)
    }

    async fn record_run(&self, user: &str, name: &str, run: LastRun) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut playlists = self.load_playlists(user).await?;
        let playlist = playlists
            .get_mut(name)
            .ok_or_else(|| Error::not_found("playlist", name))?;
        playlist.last_run = run;
        self.persist_playlists(user, &playlists).await
    }
}

#[async_trait]
impl UserStore for JsonStore {
    async fn get_user(&self, username: &str) -> Result<Option<User>> {
        let path = self.user_dir(username)?.join(USER_FILE);
        Self::load::<Option<User>>(&path).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut dir = match tokio::fs::read_dir(self.root.join(USERS_DIR)).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut users = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let Some(username) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            match self.get_user(&username).await {
                Ok(Some(user)) => users.push(user),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(user = %username, error = %e, "skipping unreadable user record");
                }
            }
        }
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn save_user(&self, user: User) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let path = self.user_dir(&user.username)?.join(USER_FILE);
        Self::persist(&path, &user).await
    }
}
