use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::utils;

pub const DEFAULT_RECOMMENDATION_SAMPLE: u32 = 10;
pub const DEFAULT_DAY_BOUNDARY: u32 = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistType {
    #[default]
    #[serde(alias = "standard")]
    Default,
    Recents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Never,
    Success,
    Failed,
}

/// Outcome of the most recent run attempt, written by the run coordinator only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastRun {
    pub status: RunStatus,
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: Option<String>,
}

impl LastRun {
    pub fn success(at: DateTime<Utc>, tracks: usize) -> Self {
        Self {
            status: RunStatus::Success,
            at: Some(at),
            message: Some(format!("published {tracks} tracks")),
        }
    }

    pub fn failed(at: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Failed,
            at: Some(at),
            message: Some(message.into()),
        }
    }
}

/// A playlist definition.
///
/// `parts` and `playlist_references` are ordered sets: duplicates collapse and
/// iteration follows the stored sort order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    #[serde(rename = "type", default)]
    pub playlist_type: PlaylistType,
    #[serde(default)]
    pub parts: BTreeSet<String>,
    #[serde(default)]
    pub playlist_references: BTreeSet<String>,
    #[serde(default)]
    pub day_boundary: u32,
    #[serde(default = "default_recommendation_sample")]
    pub recommendation_sample: u32,
    #[serde(default)]
    pub shuffle: bool,
    #[serde(default)]
    pub include_recommendations: bool,
    /// Destination playlist on the provider.
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub add_last_month: bool,
    #[serde(default)]
    pub description_overwrite: Option<String>,
    #[serde(default)]
    pub description_suffix: Option<String>,
    #[serde(default)]
    pub last_run: LastRun,
}

fn default_recommendation_sample() -> u32 {
    DEFAULT_RECOMMENDATION_SAMPLE
}

impl Playlist {
    pub fn new(name: impl Into<String>, playlist_type: PlaylistType) -> Self {
        Self {
            name: name.into(),
            playlist_type,
            parts: BTreeSet::new(),
            playlist_references: BTreeSet::new(),
            day_boundary: match playlist_type {
                PlaylistType::Recents => DEFAULT_DAY_BOUNDARY,
                PlaylistType::Default => 0,
            },
            recommendation_sample: DEFAULT_RECOMMENDATION_SAMPLE,
            shuffle: false,
            include_recommendations: false,
            uri: None,
            add_last_month: false,
            description_overwrite: None,
            description_suffix: None,
            last_run: LastRun::default(),
        }
    }

    pub fn is_recents(&self) -> bool {
        self.playlist_type == PlaylistType::Recents
    }

    pub fn has_sources(&self) -> bool {
        !self.parts.is_empty() || !self.playlist_references.is_empty()
    }

    /// Sorted names of every part and reference.
    pub fn sources(&self) -> Vec<&str> {
        let mut sources: Vec<&str> = self
            .parts
            .iter()
            .chain(self.playlist_references.iter())
            .map(String::as_str)
            .collect();
        sources.sort_unstable();
        sources.dedup();
        sources
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(rename = "type", default)]
    pub user_type: UserType,
    #[serde(default)]
    pub spotify_linked: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub token: Option<Token>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            user_type: UserType::User,
            spotify_linked: false,
            locked: false,
            token: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }
}

/// Public view of a user returned by `GET /api/user`.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub username: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub spotify_linked: bool,
    pub locked: bool,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            user_type: user.user_type,
            spotify_linked: user.spotify_linked,
            locked: user.locked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

/// One calendar month, the unit of a recents window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthOfTheYear {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTrack {
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub uri: Option<String>,
}

impl SpotifyTrack {
    /// Local files have no id or uri and cannot be published.
    pub fn into_track(self) -> Option<Track> {
        Some(Track {
            id: self.id?,
            name: self.name.unwrap_or_default(),
            uri: self.uri?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<SpotifyTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItemsResponse {
    pub items: Vec<PlaylistItem>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderPlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUserPlaylistsResponse {
    pub items: Vec<ProviderPlaylist>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub tracks: Vec<SpotifyTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackUrisRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePlaylistDetailsRequest {
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub public: bool,
    pub description: String,
}

/// A playback device of the user. Restricted devices come back without an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicesResponse {
    #[serde(default)]
    pub devices: Vec<Device>,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub name: String,
    #[tabled(rename = "type")]
    pub playlist_type: String,
    pub sources: String,
    pub last_run: String,
}

impl From<&Playlist> for PlaylistTableRow {
    fn from(playlist: &Playlist) -> Self {
        let last_run = match (&playlist.last_run.status, &playlist.last_run.at) {
            (RunStatus::Never, _) | (_, None) => "never".to_string(),
            (status, Some(at)) => format!("{:?} {}", status, at.format("%Y-%m-%d %H:%M")),
        };
        // month buckets in calendar order, ahead of everything else
        let mut sources = playlist.sources();
        sources.sort_by(|a, b| utils::compare_month_tokens(a, b));
        Self {
            name: playlist.name.clone(),
            playlist_type: format!("{:?}", playlist.playlist_type).to_lowercase(),
            sources: sources.join(", "),
            last_run,
        }
    }
}

#[derive(Tabled)]
pub struct RunTableRow {
    pub playlist: String,
    pub outcome: String,
}
