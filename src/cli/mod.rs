//! # CLI Module
//!
//! User-facing commands of the `spotmix` binary.
//!
//! - [`serve`] - JSON API plus the periodic run-all trigger
//! - [`run`] - one playlist, in the foreground
//! - [`run_all`] - every runnable playlist of a user, with a result table
//! - [`playlists`] - stored definitions of a user
//!
//! All commands work on the JSON store under the data directory and talk to
//! Spotify with the tokens stored there.

mod playlists;
mod run;
mod serve;

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config,
    runner::{Coordinator, RunnerConfig},
    spotify::SpotifyFactory,
    store::JsonStore,
};

pub use playlists::playlists;
pub use run::{run, run_all};
pub use serve::serve;

/// Shared wiring for the commands.
pub struct Context {
    pub store: Arc<JsonStore>,
    pub coordinator: Arc<Coordinator>,
}

impl Context {
    pub fn from_env() -> Self {
        let store = Arc::new(JsonStore::new(config::data_dir()));
        let providers = Arc::new(SpotifyFactory::new(store.clone()));
        let coordinator = Arc::new(Coordinator::new(
            store.clone(),
            store.clone(),
            providers,
            RunnerConfig::from_env(),
        ));
        Self { store, coordinator }
    }
}

fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.into());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
