use tabled::Table;

use crate::{
    cli::{Context, spinner},
    error, success,
    types::RunTableRow,
    warning,
};

/// Runs one playlist and waits for the outcome.
pub async fn run(user: &str, name: &str) {
    let ctx = Context::from_env();
    let pb = spinner(format!("Running {name}..."));

    let result = ctx.coordinator.run_playlist(user, name).await;
    pb.finish_and_clear();

    match result {
        Ok(tracks) => success!("Published {} tracks to {}.", tracks, name),
        Err(e) => error!("Run of {} failed: {}", name, e),
    }
}

/// Runs every runnable playlist of `user` and prints one row per playlist.
pub async fn run_all(user: &str) {
    let ctx = Context::from_env();
    let pb = spinner(format!("Running all playlists of {user}..."));

    let result = ctx.coordinator.run_all(user).await;
    pb.finish_and_clear();

    let reports = match result {
        Ok(reports) => reports,
        Err(e) => error!("Cannot run playlists of {}: {}", user, e),
    };
    if reports.is_empty() {
        warning!("No playlist of {} has sources and a destination.", user);
        return;
    }

    let failed = reports.iter().filter(|r| !r.is_success()).count();
    let rows: Vec<RunTableRow> = reports
        .iter()
        .map(|report| RunTableRow {
            playlist: report.playlist.clone(),
            outcome: report.outcome.to_string(),
        })
        .collect();
    println!("{}", Table::new(rows));

    if failed == 0 {
        success!("All {} playlists published.", reports.len());
    } else {
        warning!("{} of {} playlists failed.", failed, reports.len());
    }
}
