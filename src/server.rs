use std::{net::SocketAddr, str::FromStr};

use crate::{
    api::{self, AppState},
    config,
    error::{Error, Result},
};

/// Binds the JSON API to `SERVER_ADDRESS` and serves until the process ends.
pub async fn start_api_server(state: AppState) -> Result<()> {
    let app = api::router(state);

    let addr = SocketAddr::from_str(&config::server_addr())
        .map_err(|e| Error::Config(format!("failed to parse server address: {e}")))?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
