// Server module entry point
// Listeners, connection serving, TLS setup and shutdown signals

pub mod connection;
pub mod https;
pub mod listener;
pub mod signal;
pub mod tls;

// `loop` is a keyword, so the module gets another name
#[path = "loop.rs"]
pub mod server_loop;

pub use connection::Transport;
pub use https::start_https;
pub use listener::bind_listener;
pub use server_loop::{start_server_loop, ServerLoopConfig};
pub use tls::{load_acceptor, TlsSetupError};
