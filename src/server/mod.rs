//! Liveness HTTP surface
//!
//! One JSON endpoint exposing the watcher's status projection for uptime
//! monitors and orchestration platforms. Handlers only read atomics, so the
//! response is constant-time regardless of sweep state. A termination signal
//! stops the listener and the process exits promptly; an in-flight sweep is
//! abandoned rather than drained, since an abandoned sweep leaves nothing to
//! clean up.

use anyhow::{Context, Result};
use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::checker::{RunState, WatcherStatus};

/// Interval between keep-alive self-pings
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Build the liveness router
pub fn router(state: Arc<RunState>) -> Router {
    Router::new()
        .route("/", get(status_handler))
        .route("/health", get(status_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn status_handler(State(state): State<Arc<RunState>>) -> Json<WatcherStatus> {
    Json(WatcherStatus::from_state(&state))
}

/// Serve the liveness endpoint until a termination signal arrives
pub async fn run(port: u16, state: Arc<RunState>) -> Result<()> {
    let app = router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("liveness endpoint listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("liveness server failed")?;

    Ok(())
}

/// Resolve when SIGTERM or ctrl-c arrives
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to install ctrl-c handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("termination signal received, shutting down");
}

/// Ping the given URL every few minutes so free-tier hosts keep the process
/// warm. Failures are logged and the loop continues.
pub fn spawn_keep_alive(url: String) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!(url = %url, "keep-alive ping enabled");

        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                warn!("keep-alive client could not be created: {e}");
                return;
            }
        };

        let mut ticker = tokio::time::interval(KEEP_ALIVE_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // Consume the immediate first tick; the process is warm at startup
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match client.get(&url).send().await {
                Ok(response) => info!(status = %response.status(), "keep-alive ping sent"),
                Err(e) => warn!("keep-alive ping failed: {e}"),
            }
        }
    })
}
