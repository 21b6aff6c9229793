// Listener module
// Binds the HTTP and HTTPS listening sockets

use std::io;
use std::net::SocketAddr;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

const LISTEN_BACKLOG: i32 = 1024;

/// Bind a non-blocking listener on `addr` with `SO_REUSEADDR` set
///
/// Restarting right after a shutdown would otherwise fail while old
/// connections sit in `TIME_WAIT`. Must be called inside a Tokio runtime.
pub fn bind_listener(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
