use crate::{
    error::Result,
    spotify::SpotifyClient,
    types::{
        CreatePlaylistRequest, GetUserPlaylistsResponse, PlaylistItemsResponse, ProviderPlaylist,
        SpotifyTrack, Track, TrackUrisRequest, UpdatePlaylistDetailsRequest,
    },
};

/// Spotify accepts at most this many uris per playlist write.
pub const MAX_TRACKS_PER_REQUEST: usize = 100;

const PLAYLISTS_PAGE_LIMIT: u32 = 50;
const ITEMS_PAGE_LIMIT: u32 = 100;

impl SpotifyClient {
    /// Retrieves all playlists of the current user, following pagination.
    ///
    /// Uses `GET /me/playlists` and walks the `next` links until the last page.
    pub async fn get_user_playlists(&self) -> Result<Vec<ProviderPlaylist>> {
        let mut url = format!(
            "{base}/me/playlists?limit={limit}",
            base = self.base_url,
            limit = PLAYLISTS_PAGE_LIMIT
        );
        let mut playlists = Vec::new();

        loop {
            let page: GetUserPlaylistsResponse = self.send(self.http.get(&url)).await?.json().await?;
            playlists.extend(page.items);
            match page.next {
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(playlists)
    }

    /// Retrieves the tracks of a playlist.
    ///
    /// Local files and removed tracks come back without an id and are skipped.
    pub async fn get_playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>> {
        let mut url = format!(
            "{base}/playlists/{playlist_id}/tracks?limit={limit}&fields=items(track(id,name,uri)),next",
            base = self.base_url,
            limit = ITEMS_PAGE_LIMIT
        );
        let mut tracks = Vec::new();

        loop {
            let page: PlaylistItemsResponse = self.send(self.http.get(&url)).await?.json().await?;
            tracks.extend(
                page.items
                    .into_iter()
                    .filter_map(|item| item.track.and_then(SpotifyTrack::into_track)),
            );
            match page.next {
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(tracks)
    }

    /// Replaces the playlist contents with `uris`.
    ///
    /// The first chunk goes out as `PUT` (replace), remaining chunks as `POST`
    /// (append). An empty `uris` clears the playlist.
    pub async fn replace_playlist_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        let url = format!("{base}/playlists/{playlist_id}/tracks", base = self.base_url);
        let mut chunks = uris.chunks(MAX_TRACKS_PER_REQUEST);

        let first = chunks.next().unwrap_or_default();
        self.send(self.http.put(&url).json(&TrackUrisRequest {
            uris: first.to_vec(),
        }))
        .await?;

        for chunk in chunks {
            self.send(self.http.post(&url).json(&TrackUrisRequest {
                uris: chunk.to_vec(),
            }))
            .await?;
        }

        Ok(())
    }

    pub async fn update_playlist_description(
        &self,
        playlist_id: &str,
        description: &str,
    ) -> Result<()> {
        let url = format!("{base}/playlists/{playlist_id}", base = self.base_url);
        self.send(self.http.put(&url).json(&UpdatePlaylistDetailsRequest {
            description: description.to_string(),
        }))
        .await?;
        Ok(())
    }

    /// Creates a private, empty playlist with `POST /me/playlists`.
    pub async fn create_user_playlist(&self, name: &str) -> Result<ProviderPlaylist> {
        let url = format!("{base}/me/playlists", base = self.base_url);
        let created: ProviderPlaylist = self
            .send(self.http.post(&url).json(&CreatePlaylistRequest {
                name: name.to_string(),
                public: false,
                description: String::new(),
            }))
            .await?
            .json()
            .await?;
        tracing::info!(playlist = name, id = %created.id, "created spotify playlist");
        Ok(created)
    }
}
