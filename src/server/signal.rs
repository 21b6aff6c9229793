// Signal handling module
//
// SIGINT (Ctrl+C) and SIGTERM both request shutdown. Other platforms only
// get Ctrl+C.

use crate::logger;

/// Resolve once the process has been asked to stop
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            logger::log_warning(&format!("Failed to register SIGTERM handler: {e}"));
            ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        () = ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

/// Windows fallback, only handles Ctrl+C
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
        // Without a handler there is nothing to wait for; keep serving
        std::future::pending::<()>().await;
    }
}
