use std::sync::Arc;

use crate::{
    api::AppState, cli::Context, config, error, info, runner::scheduler,
    server::start_api_server,
};

/// Runs the API server, and unless `no_schedule` is set, the periodic run-all.
pub async fn serve(no_schedule: bool) {
    let ctx = Context::from_env();

    if no_schedule {
        info!("Scheduled runs disabled.");
    } else {
        let period = config::run_interval();
        info!("Scheduling run-all every {} minutes.", period.as_secs() / 60);
        scheduler::spawn(Arc::clone(&ctx.coordinator), period);
    }

    let state = AppState::new(ctx.store.clone(), ctx.store.clone(), ctx.coordinator);
    info!("Serving API on {}", config::server_addr());
    if let Err(e) = start_api_server(state).await {
        error!("API server stopped: {}", e);
    }
}
