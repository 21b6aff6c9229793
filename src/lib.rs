//! Static file server: directory listings and resumable byte-range downloads
//! over HTTP/1.1, HTTP/2 and optional TLS.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
