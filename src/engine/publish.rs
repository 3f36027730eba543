use crate::{
    error::{Error, Result, ValidationError},
    provider::Provider,
    types::{Playlist, Track},
    utils,
};

/// Description written to the destination playlist.
///
/// `description_overwrite` wins when set, otherwise the sorted source names
/// are listed. `description_suffix` is appended in both cases.
pub fn description(playlist: &Playlist) -> String {
    let base = match playlist.description_overwrite.as_deref() {
        Some(overwrite) if !overwrite.is_empty() => overwrite.to_string(),
        _ => playlist.sources().join(", "),
    };

    match playlist.description_suffix.as_deref() {
        Some(suffix) if !suffix.is_empty() && base.is_empty() => suffix.to_string(),
        Some(suffix) if !suffix.is_empty() => format!("{base} {suffix}"),
        _ => base,
    }
}

/// Destination id of `playlist` on the provider.
pub fn destination(playlist: &Playlist) -> Result<String> {
    let uri = playlist
        .uri
        .as_deref()
        .filter(|uri| !uri.trim().is_empty())
        .ok_or_else(|| ValidationError::NoDestination(playlist.name.clone()))?;
    utils::playlist_id_from_uri(uri)
        .ok_or_else(|| Error::invalid_input(format!("unrecognised playlist uri {uri}")))
}

/// Replaces the destination contents with `tracks` and refreshes its description.
///
/// Full replacement, so publishing the same tracks again is a no-op on the
/// provider side.
pub async fn publish(provider: &dyn Provider, playlist: &Playlist, tracks: &[Track]) -> Result<()> {
    let id = destination(playlist)?;
    let uris: Vec<String> = tracks.iter().map(|t| t.uri.clone()).collect();

    provider.replace_tracks(&id, &uris).await?;
    provider.set_description(&id, &description(playlist)).await?;

    tracing::info!(playlist = %playlist.name, destination = %id, tracks = uris.len(), "published");
    Ok(())
}
