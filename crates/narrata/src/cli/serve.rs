//! `serve` command handler.

use narrata::{NarrataConfig, build_state, serve};

/// Handle the `serve` command
pub async fn handle_serve(
    config: &NarrataConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut server = config.server().clone();
    if let Some(host) = host {
        server = server.with_host(host);
    }
    if let Some(port) = port {
        server = server.with_port(port);
    }

    let state = build_state(config)?;
    tracing::info!(address = %server.bind_address(), "narrata server starting. Press Ctrl+C to stop.");
    serve(&server, state).await?;
    Ok(())
}
