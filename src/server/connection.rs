// Connection handling module
// Accepts a single TCP connection and serves HTTP on it

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto;
use tokio::net::TcpStream;
use tokio_rustls::TlsAcceptor;

use crate::config::{AppState, Config, ServedProtocols};
use crate::handler::{self, RequestContext};
use crate::logger;

/// How bytes reach the HTTP layer on a listener
#[derive(Clone)]
pub enum Transport {
    Plain,
    Tls(TlsAcceptor),
}

/// Holds one slot of the active connection count until dropped
struct ConnectionSlot(Arc<AtomicUsize>);

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Accept a connection, enforce the connection limit and serve it on a new task
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
    transport: &Transport,
) {
    // Increment first, then check, so concurrent accepts cannot both slip in
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);
    let slot = ConnectionSlot(Arc::clone(conn_counter));

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            drop(slot);
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);

    let state = Arc::clone(state);
    let transport = transport.clone();
    tokio::spawn(async move {
        let _slot = slot;
        match transport {
            Transport::Plain => serve_io(TokioIo::new(stream), state, peer_addr).await,
            Transport::Tls(acceptor) => match acceptor.accept(stream).await {
                Ok(tls_stream) => serve_io(TokioIo::new(tls_stream), state, peer_addr).await,
                Err(e) => logger::log_debug(&format!("TLS handshake with {peer_addr} failed: {e}")),
            },
        }
    });
}

/// Serve HTTP on an established byte stream until the peer goes away
///
/// There is no deadline on the connection as a whole; large downloads can
/// take as long as the client needs.
pub async fn serve_io<I>(io: I, state: Arc<AppState>, peer_addr: SocketAddr)
where
    I: hyper::rt::Read + hyper::rt::Write + Unpin + Send + 'static,
{
    let builder = connection_builder(&state.config);

    let service = service_fn(move |req: Request<Incoming>| {
        let ctx = RequestContext::from_request(&req, peer_addr);
        handler::handle_request(ctx, Arc::clone(&state))
    });

    if let Err(err) = builder.serve_connection(io, service).await {
        logger::log_connection_error(&err);
    }
}

fn connection_builder(config: &Config) -> auto::Builder<TokioExecutor> {
    let mut builder = auto::Builder::new(TokioExecutor::new());

    let performance = &config.performance;
    let mut http1 = builder.http1();
    http1.keep_alive(performance.keep_alive).timer(TokioTimer::new());
    if performance.header_read_timeout > 0 {
        http1.header_read_timeout(Duration::from_secs(performance.header_read_timeout));
    }
    builder.http2().timer(TokioTimer::new());

    match config.server.protocols.served() {
        ServedProtocols::Http1Only => builder.http1_only(),
        ServedProtocols::Http2Only => builder.http2_only(),
        ServedProtocols::Both => builder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HttpProtocols, Overrides};
    use crate::server::listener::bind_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn test_state(root: &std::path::Path, tweak: impl FnOnce(&mut Config)) -> Arc<AppState> {
        let cfg_dir = tempfile::tempdir().unwrap();
        let overrides = Overrides {
            working_directory: Some(root.to_path_buf()),
            port: None,
        };
        let mut cfg = Config::load_from(cfg_dir.path().join("config").to_str().unwrap(), &overrides)
            .unwrap();
        cfg.logging.access_log = false;
        tweak(&mut cfg);
        Arc::new(AppState::new(cfg).unwrap())
    }

    /// Accept exactly one connection on an ephemeral port, return its address
    async fn serve_once(state: Arc<AppState>, counter: Arc<AtomicUsize>) -> SocketAddr {
        let listener = bind_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, peer) = listener.accept().await.unwrap();
            accept_connection(stream, peer, &state, &counter, &Transport::Plain);
        });
        addr
    }

    async fn roundtrip(addr: SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        String::from_utf8_lossy(&raw).into_owned()
    }

    #[tokio::test]
    async fn test_range_request_over_tcp() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("alpha.txt"), b"abcdefghijklmnopqrstuvwxyz").unwrap();
        let state = test_state(dir.path(), |_| {});
        let addr = serve_once(state, Arc::new(AtomicUsize::new(0))).await;

        let response = roundtrip(
            addr,
            "GET /alpha.txt HTTP/1.1\r\nHost: localhost\r\nRange: bytes=2-5\r\nConnection: close\r\n\r\n",
        )
        .await;

        assert!(response.starts_with("HTTP/1.1 206 Partial Content"), "{response}");
        assert!(response.contains("content-range: bytes 2-5/26"));
        assert!(response.ends_with("\r\n\r\ncdef"));
    }

    #[tokio::test]
    async fn test_http1_only_listener() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), |cfg| cfg.server.protocols = HttpProtocols::Http1);
        let addr = serve_once(state, Arc::new(AtomicUsize::new(0))).await;

        let response = roundtrip(
            addr,
            "GET /nothing HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 404 Not Found"), "{response}");
        assert!(response.ends_with("Not found."));
    }

    #[tokio::test]
    async fn test_connection_limit_rejects_and_releases() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), |cfg| cfg.performance.max_connections = Some(1));
        // One connection already counted
        let counter = Arc::new(AtomicUsize::new(1));
        let addr = serve_once(state, Arc::clone(&counter)).await;

        let mut stream = TcpStream::connect(addr).await.unwrap();
        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        assert!(raw.is_empty());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
