//! Binding and serving.

use crate::{ApiState, ServerConfig, create_router};
use narrata_error::{NarrataResult, ServerError, ServerErrorKind};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info, instrument};

/// Binds the configured address.
///
/// # Errors
///
/// `ServerErrorKind::Bind` if the address is unavailable.
#[instrument(skip(config), fields(address = %config.bind_address()))]
pub async fn bind(config: &ServerConfig) -> NarrataResult<TcpListener> {
    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await.map_err(|e| {
        error!(error = %e, "Failed to bind");
        ServerError::new(ServerErrorKind::Bind(format!("{}: {}", address, e)))
    })?;
    Ok(listener)
}

/// Serves the API on `listener` until `shutdown` resolves.
///
/// # Errors
///
/// `ServerErrorKind::Serve` if the accept loop fails.
pub async fn serve_with_shutdown(
    listener: TcpListener,
    state: ApiState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> NarrataResult<()> {
    let local: Option<SocketAddr> = listener.local_addr().ok();
    info!(address = ?local, "Serving narrata API");
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| {
            error!(error = %e, "Server loop failed");
            ServerError::new(ServerErrorKind::Serve(e.to_string()))
        })?;
    info!("Server stopped");
    Ok(())
}

/// Binds and serves until Ctrl+C.
///
/// # Errors
///
/// Bind or serve failures.
pub async fn serve(config: &ServerConfig, state: ApiState) -> NarrataResult<()> {
    let listener = bind(config).await?;
    serve_with_shutdown(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
        info!("Shutdown requested");
    })
    .await
}
