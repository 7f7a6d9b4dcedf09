//! korak gateway
//!
//! - Webhook endpoint: POST /api/clerk/webhook (user.created -> welcome email)
//! - Metrics scrape: GET /api/metrics (alias /metrics)
//! - Liveness: GET /healthz

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use korak_core::error::{KorakError, Result};
use korak_core::metrics::Registry;
use korak_gateway::{app_state, config, email::ResendClient, router};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, code = e.client_code().as_str(), "korak-gateway failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cfg = config::load_default()?;
    let listen = cfg.server.listen_addr()?;

    // One registry for the whole process, shared through AppState.
    let registry = Arc::new(Registry::new());
    let sender = Arc::new(ResendClient::from_env(&cfg.email)?);

    let state = app_state::AppState::new(cfg, registry, sender)?;
    let app = router::build_router(state);

    tracing::info!(%listen, "korak-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| KorakError::Internal(format!("failed to bind {listen}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| KorakError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
