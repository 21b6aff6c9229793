//! Logger module
//!
//! Provides logging utilities for the server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging with a level filter
//! - File-based logging support

mod format;
pub mod writer;

pub use format::{AccessLogEntry, AccessLogFormat};

use crate::config::{Config, HttpProtocols};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Message severity, lower is more severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl Level {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "error" => Self::Error,
            "warn" | "warning" => Self::Warn,
            "debug" | "trace" => Self::Debug,
            _ => Self::Info,
        }
    }
}

static MAX_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    MAX_LEVEL.store(Level::parse(&config.logging.level) as u8, Ordering::Relaxed);
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn enabled(level: Level) -> bool {
    level as u8 <= MAX_LEVEL.load(Ordering::Relaxed)
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_info(message: &str) {
    if enabled(Level::Info) {
        write_info(message);
    }
}

pub fn log_debug(message: &str) {
    if enabled(Level::Debug) {
        write_info(&format!("[DEBUG] {message}"));
    }
}

pub fn log_warning(message: &str) {
    if enabled(Level::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

/// Write one access line; not subject to the level filter
pub fn log_access(entry: &AccessLogEntry, format: AccessLogFormat) {
    write_info(&entry.format(format));
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, root: &std::path::Path) {
    log_info("======================================");
    log_info("Server started successfully");
    log_info(&format!("Listening on: http://{addr}"));
    log_info(&format!("Serving: {}", root.display()));
    log_info(&format!("Protocols: {:?}", config.server.protocols));
    log_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        log_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        log_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        log_info(&format!("Error log: {path}"));
    }
    log_info("======================================\n");
}

pub fn log_https_started(addr: &SocketAddr) {
    log_info(&format!("[HTTPS] Listening on: https://{addr}"));
}

pub fn log_https_disabled(reason: &impl std::fmt::Display) {
    log_warning(&format!("HTTPS listener not started: {reason}"));
    log_warning("Continuing with the HTTP listener only");
}

pub fn log_protocol_fallback(configured: HttpProtocols) {
    if configured.includes_http3() {
        log_warning("HTTP/3 is not supported, serving HTTP/1.1 and HTTP/2 only");
    }
    if configured.falls_back() {
        log_warning(&format!(
            "Protocol set {configured:?} has nothing servable, falling back to HTTP/1.1"
        ));
    }
}

pub fn log_config_written(path: &std::path::Path) {
    log_info(&format!("[CONFIG] Wrote default configuration to {}", path.display()));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    log_debug(&format!("Connection closed with error: {err}"));
}

pub fn log_shutdown() {
    log_info("\n[SHUTDOWN] Signal received, stopping listeners");
}
