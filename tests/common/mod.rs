#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use spotmix::{
    error::{Error, Result, ValidationError},
    provider::{Provider, ProviderFactory},
    runner::{Coordinator, RetryPolicy, RunnerConfig},
    store::MemoryStore,
    types::{Device, Playlist, PlaylistType, ProviderPlaylist, Token, Track, User},
};

pub fn track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        name: format!("Track {}", id),
        uri: format!("spotify:track:{}", id),
    }
}

pub fn ids(tracks: &[Track]) -> Vec<&str> {
    tracks.iter().map(|t| t.id.as_str()).collect()
}

/// Definition with the given parts, references and destination.
pub fn playlist(name: &str, parts: &[&str], references: &[&str], uri: Option<&str>) -> Playlist {
    let mut playlist = Playlist::new(name, PlaylistType::Default);
    playlist.parts = parts.iter().map(|p| p.to_string()).collect();
    playlist.playlist_references = references.iter().map(|r| r.to_string()).collect();
    playlist.uri = uri.map(str::to_string);
    playlist
}

pub fn definitions(playlists: Vec<Playlist>) -> HashMap<String, Playlist> {
    playlists.into_iter().map(|p| (p.name.clone(), p)).collect()
}

pub fn linked_user(username: &str) -> User {
    let mut user = User::new(username);
    user.spotify_linked = true;
    user.token = Some(Token {
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
        scope: String::new(),
        expires_in: 3600,
        obtained_at: u64::MAX / 2,
    });
    user
}

pub fn fast_config() -> RunnerConfig {
    RunnerConfig {
        workers: 2,
        retry: RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        },
        timeout: Duration::from_secs(5),
    }
}

/// In-memory provider with call counters and failure injection.
#[derive(Default)]
pub struct MockProvider {
    playlists: Vec<ProviderPlaylist>,
    tracks: HashMap<String, Vec<Track>>,
    recommended: Vec<Track>,
    devices: Vec<Device>,
    delay: Option<Duration>,
    transient_failures: AtomicUsize,
    permanent_failure: bool,

    pub user_playlists_calls: AtomicUsize,
    pub playlist_tracks_calls: Mutex<HashMap<String, usize>>,
    pub recommendation_seeds: Mutex<Vec<Vec<String>>>,
    pub replace_calls: AtomicUsize,
    pub published: Mutex<HashMap<String, Vec<String>>>,
    pub descriptions: Mutex<HashMap<String, String>>,
    pub created: Mutex<Vec<String>>,
    pub played: Mutex<Vec<(Option<String>, Vec<String>)>>,

    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a provider playlist `name` with id `<name>-id` holding `track_ids`.
    pub fn with_playlist(mut self, name: &str, track_ids: &[&str]) -> Self {
        let id = format!("{}-id", name.replace(' ', "-"));
        self.playlists.push(ProviderPlaylist {
            id: id.clone(),
            name: name.to_string(),
            uri: format!("spotify:playlist:{}", id),
        });
        self.tracks
            .insert(id, track_ids.iter().map(|t| track(t)).collect());
        self
    }

    pub fn with_recommendations(mut self, track_ids: &[&str]) -> Self {
        self.recommended = track_ids.iter().map(|t| track(t)).collect();
        self
    }

    /// Adds a playback device `name` with id `<name>-device`.
    pub fn with_device(mut self, name: &str) -> Self {
        self.devices.push(Device {
            id: Some(format!("{}-device", name)),
            name: name.to_string(),
            is_active: false,
        });
        self
    }

    /// Every `user_playlists` call sleeps for `delay` first.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// The next `times` calls of `user_playlists` fail with a transient error.
    pub fn failing_times(self, times: usize) -> Self {
        self.transient_failures.store(times, Ordering::SeqCst);
        self
    }

    pub fn failing_permanently(mut self) -> Self {
        self.permanent_failure = true;
        self
    }

    pub fn user_playlists_calls(&self) -> usize {
        self.user_playlists_calls.load(Ordering::SeqCst)
    }

    pub fn playlist_tracks_calls(&self, playlist_id: &str) -> usize {
        self.playlist_tracks_calls
            .lock()
            .unwrap()
            .get(playlist_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn published(&self, playlist_id: &str) -> Option<Vec<String>> {
        self.published.lock().unwrap().get(playlist_id).cloned()
    }

    pub fn description(&self, playlist_id: &str) -> Option<String> {
        self.descriptions.lock().unwrap().get(playlist_id).cloned()
    }

    pub fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    pub fn played(&self) -> Vec<(Option<String>, Vec<String>)> {
        self.played.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn user_playlists(&self) -> Result<Vec<ProviderPlaylist>> {
        self.user_playlists_calls.fetch_add(1, Ordering::SeqCst);

        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.permanent_failure {
            return Err(Error::Provider("403 Forbidden".to_string()));
        }
        let remaining = self.transient_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_failures
                .store(remaining - 1, Ordering::SeqCst);
            return Err(Error::transient("429 Too Many Requests"));
        }
        Ok(self.playlists.clone())
    }

    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>> {
        *self
            .playlist_tracks_calls
            .lock()
            .unwrap()
            .entry(playlist_id.to_string())
            .or_default() += 1;
        self.tracks
            .get(playlist_id)
            .cloned()
            .ok_or_else(|| Error::Provider(format!("404 unknown playlist {}", playlist_id)))
    }

    async fn recommendations(&self, seed_ids: &[String], limit: u32) -> Result<Vec<Track>> {
        self.recommendation_seeds
            .lock()
            .unwrap()
            .push(seed_ids.to_vec());
        Ok(self
            .recommended
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn replace_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        self.replace_calls.fetch_add(1, Ordering::SeqCst);
        self.published
            .lock()
            .unwrap()
            .insert(playlist_id.to_string(), uris.to_vec());
        Ok(())
    }

    async fn set_description(&self, playlist_id: &str, description: &str) -> Result<()> {
        self.descriptions
            .lock()
            .unwrap()
            .insert(playlist_id.to_string(), description.to_string());
        Ok(())
    }

    async fn create_playlist(&self, name: &str) -> Result<ProviderPlaylist> {
        if self.permanent_failure {
            return Err(Error::Provider("403 Forbidden".to_string()));
        }
        self.created.lock().unwrap().push(name.to_string());
        let id = format!("{}-created", name.replace(' ', "-"));
        Ok(ProviderPlaylist {
            uri: format!("spotify:playlist:{}", id),
            id,
            name: name.to_string(),
        })
    }

    async fn devices(&self) -> Result<Vec<Device>> {
        Ok(self.devices.clone())
    }

    async fn play(&self, device_id: Option<&str>, uris: &[String]) -> Result<()> {
        self.played
            .lock()
            .unwrap()
            .push((device_id.map(str::to_string), uris.to_vec()));
        Ok(())
    }
}

/// Hands out the same [`MockProvider`] to every linked user.
pub struct MockFactory {
    pub provider: Arc<MockProvider>,
    pub connects: AtomicUsize,
}

impl MockFactory {
    pub fn new(provider: Arc<MockProvider>) -> Self {
        Self {
            provider,
            connects: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ProviderFactory for MockFactory {
    async fn connect(&self, user: &User) -> Result<Arc<dyn Provider>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if !user.spotify_linked {
            return Err(ValidationError::NotLinked.into());
        }
        Ok(self.provider.clone())
    }
}

pub fn coordinator(
    store: Arc<MemoryStore>,
    provider: Arc<MockProvider>,
    config: RunnerConfig,
) -> Arc<Coordinator> {
    Arc::new(Coordinator::new(
        store.clone(),
        store,
        Arc::new(MockFactory::new(provider)),
        config,
    ))
}

/// Waits until the provider saw a playback request.
pub async fn wait_until_played(provider: &MockProvider) -> (Option<String>, Vec<String>) {
    for _ in 0..200 {
        if let Some(played) = provider.played().pop() {
            return played;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("playback never started");
}

/// Waits until no run of `playlist` holds the lock.
pub async fn wait_until_idle(coordinator: &Coordinator, user: &str, playlist: &str) {
    for _ in 0..200 {
        if !coordinator.locks().is_running(user, playlist) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("run of {} never finished", playlist);
}
