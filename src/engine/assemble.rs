use std::collections::HashMap;

use chrono::NaiveDate;

use crate::{
    engine::{graph, recents},
    error::{Error, Result},
    provider::Provider,
    types::{Playlist, Track},
    utils,
};

/// Concatenates `sources` in order and drops repeated track ids, keeping the
/// first occurrence.
pub fn merge<I>(sources: I) -> Vec<Track>
where
    I: IntoIterator,
    I::Item: IntoIterator<Item = Track>,
{
    let mut tracks: Vec<Track> = sources.into_iter().flatten().collect();
    utils::remove_duplicate_tracks(&mut tracks);
    tracks
}

/// Resolves playlist definitions into track lists for a single run.
///
/// Each referenced playlist is assembled once and each provider playlist is
/// read once, however many paths lead to them.
pub struct Assembler<'a> {
    provider: &'a dyn Provider,
    definitions: &'a HashMap<String, Playlist>,
    today: NaiveDate,
    resolved: HashMap<String, Vec<Track>>,
    part_tracks: HashMap<String, Vec<Track>>,
    provider_playlists: Option<HashMap<String, String>>,
}

impl<'a> Assembler<'a> {
    pub fn new(
        provider: &'a dyn Provider,
        definitions: &'a HashMap<String, Playlist>,
        today: NaiveDate,
    ) -> Self {
        Self {
            provider,
            definitions,
            today,
            resolved: HashMap::new(),
            part_tracks: HashMap::new(),
            provider_playlists: None,
        }
    }

    /// Assembles `target` and everything it references.
    ///
    /// Resolution order is fixed before any provider call, so a cycle or a
    /// dangling reference fails the run without fetching a single track.
    pub async fn assemble(&mut self, target: &str) -> Result<Vec<Track>> {
        let today = self.today;
        let order = graph::resolve_order(self.definitions, target, |playlist| {
            recents::included_references(playlist, today)
        })?;
        tracing::debug!(playlist = target, order = ?order, "resolved reference order");

        for name in &order {
            if self.resolved.contains_key(name) {
                continue;
            }
            let tracks = self.assemble_one(name).await?;
            self.resolved.insert(name.clone(), tracks);
        }

        Ok(self.resolved.get(target).cloned().unwrap_or_default())
    }

    /// Names assembled so far, for diagnostics.
    pub fn resolved_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resolved.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    async fn assemble_one(&mut self, name: &str) -> Result<Vec<Track>> {
        let definitions = self.definitions;
        let playlist = definitions
            .get(name)
            .ok_or_else(|| Error::not_found("playlist", name))?;

        let mut sources: Vec<Vec<Track>> = Vec::new();
        for part in &playlist.parts {
            sources.push(self.part(part).await?);
        }
        for reference in recents::included_references(playlist, self.today) {
            // resolve_order guarantees dependencies are assembled first
            if let Some(tracks) = self.resolved.get(reference) {
                sources.push(tracks.clone());
            }
        }

        let tracks = merge(sources);
        tracing::debug!(playlist = name, tracks = tracks.len(), "assembled playlist");
        Ok(tracks)
    }

    async fn part(&mut self, name: &str) -> Result<Vec<Track>> {
        if let Some(tracks) = self.part_tracks.get(name) {
            return Ok(tracks.clone());
        }

        let tracks = match self.provider_playlist_id(name).await? {
            Some(id) => self.provider.playlist_tracks(&id).await?,
            None => {
                tracing::warn!(part = name, "no provider playlist with this name, skipping");
                Vec::new()
            }
        };
        self.part_tracks.insert(name.to_string(), tracks.clone());
        Ok(tracks)
    }

    async fn provider_playlist_id(&mut self, name: &str) -> Result<Option<String>> {
        if self.provider_playlists.is_none() {
            let mut ids = HashMap::new();
            for playlist in self.provider.user_playlists().await? {
                ids.entry(playlist.name).or_insert(playlist.id);
            }
            self.provider_playlists = Some(ids);
        }
        Ok(self
            .provider_playlists
            .as_ref()
            .and_then(|ids| ids.get(name).cloned()))
    }
}
