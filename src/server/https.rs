// HTTPS listener module
// Starts the TLS accept loop next to the plain HTTP one

use std::error::Error;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::connection::Transport;
use super::listener::bind_listener;
use super::server_loop::{start_server_loop, ServerLoopConfig};
use super::tls::load_acceptor;
use crate::config::AppState;
use crate::logger;

/// Load the certificate, bind the HTTPS port and spawn its accept loop
///
/// Any failure is returned before a task is spawned, so the caller can keep
/// running with the HTTP listener alone.
pub fn start_https(
    state: &Arc<AppState>,
    active_connections: &Arc<AtomicUsize>,
) -> Result<JoinHandle<()>, Box<dyn Error>> {
    let cfg = &state.config;
    let acceptor = load_acceptor(&cfg.tls, cfg.server.protocols.served())?;
    let addr = cfg.get_https_socket_addr()?;
    let listener = bind_listener(addr)?;
    logger::log_https_started(&addr);

    Ok(tokio::spawn(start_server_loop(
        listener,
        Arc::clone(state),
        ServerLoopConfig {
            transport: Transport::Tls(acceptor),
            active_connections: Arc::clone(active_connections),
            log_prefix: "[HTTPS] ",
        },
    )))
}
