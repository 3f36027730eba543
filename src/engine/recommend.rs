use std::collections::HashSet;

use crate::{
    error::Result,
    provider::Provider,
    types::{Playlist, Track},
};

/// Appends up to `recommendation_sample` recommended tracks to `tracks`.
///
/// Seeds are the ids already in `tracks`. Recommendations that are already
/// present are skipped and a short answer from the provider is accepted.
/// Returns the number of tracks added.
pub async fn sample(
    provider: &dyn Provider,
    playlist: &Playlist,
    tracks: &mut Vec<Track>,
) -> Result<usize> {
    if !playlist.include_recommendations || playlist.recommendation_sample == 0 {
        return Ok(0);
    }
    if tracks.is_empty() {
        tracing::debug!(playlist = %playlist.name, "no seed tracks, skipping recommendations");
        return Ok(0);
    }

    let seeds: Vec<String> = tracks.iter().map(|t| t.id.clone()).collect();
    let recommended = provider
        .recommendations(&seeds, playlist.recommendation_sample)
        .await?;

    let mut seen: HashSet<String> = seeds.into_iter().collect();
    let before = tracks.len();
    tracks.extend(
        recommended
            .into_iter()
            .take(playlist.recommendation_sample as usize)
            .filter(|track| seen.insert(track.id.clone())),
    );

    let added = tracks.len() - before;
    tracing::debug!(playlist = %playlist.name, added, "appended recommendations");
    Ok(added)
}
