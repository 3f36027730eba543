//! Playlist resolution.
//!
//! A run turns one stored definition into a published track list. The
//! stages always execute in this order:
//!
//! ```text
//! graph::resolve_order   evaluation order, cycle and dangling checks
//!        ↓
//! assemble::Assembler    parts + window-filtered references, deduplicated
//!        ↓
//! recommend::sample      optional recommendations
//!        ↓
//! shuffle::apply         optional permutation
//!        ↓
//! publish::publish       full replace of the destination
//! ```
//!
//! Recommendations and shuffling only apply to the run target; a referenced
//! playlist contributes its assembled tracks.

pub mod assemble;
pub mod graph;
pub mod publish;
pub mod recents;
pub mod recommend;
pub mod shuffle;

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::{
    error::{Error, Result},
    provider::Provider,
    types::{Playlist, Track},
};

/// Resolves `target` into its final, unpublished track list.
pub async fn build(
    provider: &dyn Provider,
    definitions: &HashMap<String, Playlist>,
    target: &str,
    today: NaiveDate,
) -> Result<Vec<Track>> {
    let playlist = definitions
        .get(target)
        .ok_or_else(|| Error::not_found("playlist", target))?;

    let mut assembler = assemble::Assembler::new(provider, definitions, today);
    let mut tracks = assembler.assemble(target).await?;

    recommend::sample(provider, playlist, &mut tracks).await?;
    shuffle::apply(playlist, &mut tracks, &mut rand::rng());

    Ok(tracks)
}

/// Builds `target` and publishes it. Returns the number of published tracks.
pub async fn execute(
    provider: &dyn Provider,
    definitions: &HashMap<String, Playlist>,
    target: &str,
    today: NaiveDate,
) -> Result<usize> {
    let playlist = definitions
        .get(target)
        .ok_or_else(|| Error::not_found("playlist", target))?;
    // fail before touching the provider when there is nowhere to publish
    publish::destination(playlist)?;

    let tracks = build(provider, definitions, target, today).await?;
    publish::publish(provider, playlist, &tracks).await?;
    Ok(tracks.len())
}
