pub mod auth;
pub mod body;
pub mod handlers;
pub mod router;
pub mod state;

use anyhow::{Context, Result};
use tokio::{
    net::TcpListener,
    signal::unix::{SignalKind, signal},
};

use crate::{config::Config, integrations::Integrations};

pub use state::AppState;

pub async fn run(config: Config) -> Result<()> {
    let bind_addr = config.server.bind_address()?;
    let integrations = Integrations::from_config(&config);
    let app = router::build(AppState::new(integrations, &config.server));

    let mut sigint =
        signal(SignalKind::interrupt()).context("unable to listen for SIGINT (Ctrl+C)")?;
    let mut sigterm = signal(SignalKind::terminate()).context("unable to listen for SIGTERM")?;

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("unable to bind {bind_addr}"))?;

    tracing::info!(
        target: "portal.server",
        port = config.server.port,
        address = %bind_addr,
        api_key_required = !config.server.api_key.is_empty(),
        nocobase_token_configured = !config.nocobase.api_token.is_empty(),
        "Improvement portal backend started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let signal_name = tokio::select! {
                _ = sigint.recv() => "SIGINT",
                _ = sigterm.recv() => "SIGTERM",
            };
            tracing::info!(target: "portal.server", signal = signal_name, "shutdown_requested");
        })
        .await
        .context("http server failed")?;

    tracing::info!(target: "portal.server", "Improvement portal backend stopped");
    Ok(())
}
