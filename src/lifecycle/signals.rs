//! OS signal handling.
//!
//! SIGINT (Ctrl+C) and SIGTERM both start a graceful shutdown, as does the
//! in-process [`Shutdown`](crate::lifecycle::Shutdown) coordinator.

use tokio::sync::broadcast;

/// Resolve on Ctrl+C, SIGTERM, or a message on `shutdown`.
pub async fn shutdown_signal(shutdown: broadcast::Receiver<()>) {
    tokio::select! {
        _ = ctrl_c() => tracing::info!("Ctrl+C received"),
        _ = terminate() => tracing::info!("SIGTERM received"),
        _ = requested(shutdown) => tracing::info!("Shutdown requested"),
    }
}

/// A dropped coordinator is not a shutdown request.
async fn requested(mut shutdown: broadcast::Receiver<()>) {
    if shutdown.recv().await.is_err() {
        std::future::pending::<()>().await;
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
