use rand::seq::SliceRandom;

use crate::{
    error::Result,
    spotify::SpotifyClient,
    types::{RecommendationsResponse, SpotifyTrack, Track},
};

/// Seed ids accepted per recommendation request.
pub const MAX_SEEDS: usize = 5;
/// Largest `limit` the recommendations endpoint takes.
pub const MAX_LIMIT: u32 = 100;

/// Picks up to [`MAX_SEEDS`] distinct ids at random.
pub fn pick_seeds(ids: &[String]) -> Vec<String> {
    let mut seeds = ids.to_vec();
    seeds.sort_unstable();
    seeds.dedup();
    seeds.shuffle(&mut rand::rng());
    seeds.truncate(MAX_SEEDS);
    seeds
}

impl SpotifyClient {
    /// Requests tracks recommended from a random sample of `seed_ids`.
    pub async fn get_recommendations(&self, seed_ids: &[String], limit: u32) -> Result<Vec<Track>> {
        let seeds = pick_seeds(seed_ids);
        if seeds.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let url = format!(
            "{base}/recommendations?seed_tracks={seeds}&limit={limit}",
            base = self.base_url,
            seeds = seeds.join(","),
            limit = limit.min(MAX_LIMIT)
        );
        let response: RecommendationsResponse = self.send(self.http.get(&url)).await?.json().await?;

        Ok(response
            .tracks
            .into_iter()
            .filter_map(SpotifyTrack::into_track)
            .collect())
    }
}
