use tabled::Table;

use crate::{
    cli::Context, error, info, store::DefinitionStore, types::PlaylistTableRow, warning,
};

/// Lists the stored definitions of `user`.
pub async fn playlists(user: &str) {
    let ctx = Context::from_env();

    let playlists = match ctx.store.list(user).await {
        Ok(playlists) => playlists,
        Err(e) => error!("Cannot load playlists of {}: {}", user, e),
    };
    if playlists.is_empty() {
        warning!("No playlists defined for {}.", user);
        return;
    }

    let rows: Vec<PlaylistTableRow> = playlists.iter().map(PlaylistTableRow::from).collect();
    info!("{} playlists defined for {}.", rows.len(), user);
    println!("{}", Table::new(rows));
}
