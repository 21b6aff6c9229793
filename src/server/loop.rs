// Server loop module
// Accepts connections on one listener until the task is dropped

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::{accept_connection, Transport};
use crate::config::AppState;
use crate::logger;

/// Pause after a failed accept, e.g. when out of file descriptors
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Per-listener settings for the accept loop
pub struct ServerLoopConfig {
    pub transport: Transport,
    /// Shared by every listener so `max_connections` is process-wide
    pub active_connections: Arc<AtomicUsize>,
    pub log_prefix: &'static str,
}

/// Accept connections forever, handing each one to its own task
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    config: ServerLoopConfig,
) {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                accept_connection(
                    stream,
                    peer_addr,
                    &state,
                    &config.active_connections,
                    &config.transport,
                );
            }
            Err(e) => {
                logger::log_error(&format!(
                    "{}Failed to accept connection: {e}",
                    config.log_prefix
                ));
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Overrides};
    use crate::server::listener::bind_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn test_loop_serves_consecutive_connections() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.txt"), b"1").unwrap();
        std::fs::write(dir.path().join("two.txt"), b"2").unwrap();

        let cfg_dir = tempfile::tempdir().unwrap();
        let overrides = Overrides {
            working_directory: Some(dir.path().to_path_buf()),
            port: None,
        };
        let mut cfg = Config::load_from(cfg_dir.path().join("config").to_str().unwrap(), &overrides)
            .unwrap();
        cfg.logging.access_log = false;
        let state = Arc::new(AppState::new(cfg).unwrap());

        let listener = bind_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let active = Arc::new(AtomicUsize::new(0));
        let server = tokio::spawn(start_server_loop(
            listener,
            state,
            ServerLoopConfig {
                transport: Transport::Plain,
                active_connections: Arc::clone(&active),
                log_prefix: "",
            },
        ));

        for (path, expected) in [("/one.txt", "1"), ("/two.txt", "2"), ("/", "one.txt")] {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
            stream.write_all(request.as_bytes()).await.unwrap();
            let mut raw = String::new();
            stream.read_to_string(&mut raw).await.unwrap();
            assert!(raw.starts_with("HTTP/1.1 200 OK"), "{raw}");
            let (_, body) = raw.split_once("\r\n\r\n").unwrap();
            assert!(body.lines().any(|line| line == expected), "{path}: {raw}");
        }

        server.abort();
    }
}
