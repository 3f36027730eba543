use rand::{Rng, seq::SliceRandom};

use crate::types::{Playlist, Track};

/// Permutes `tracks` with `rng` when the playlist asks for it.
pub fn apply<R: Rng + ?Sized>(playlist: &Playlist, tracks: &mut [Track], rng: &mut R) {
    if playlist.shuffle {
        tracks.shuffle(rng);
    }
}
