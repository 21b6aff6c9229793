// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub tls: TlsConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Root of the served tree
    pub working_directory: PathBuf,
    pub host: String,
    pub port: u16,
    /// HTTPS listener port, 0 disables it
    pub https_port: u16,
    pub protocols: HttpProtocols,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

/// TLS material for the HTTPS listener
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TlsConfig {
    pub enabled: bool,
    pub certificate_file: PathBuf,
    pub certificate_key_file: PathBuf,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (simple, combined or json)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds allowed for reading HTTP/1 request headers
    pub header_read_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u64>,
}

/// HTTP protocol set a listener should speak
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpProtocols {
    None,
    Http1,
    Http2,
    Http3,
    Http1AndHttp2,
    #[default]
    Http1AndHttp2AndHttp3,
}

/// Protocols hyper can actually serve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedProtocols {
    Http1Only,
    Http2Only,
    Both,
}

impl HttpProtocols {
    pub const fn includes_http3(self) -> bool {
        matches!(self, Self::Http3 | Self::Http1AndHttp2AndHttp3)
    }

    /// Reduce the configured set to what hyper serves
    ///
    /// HTTP/3 is dropped; a set left empty falls back to HTTP/1.1.
    pub const fn served(self) -> ServedProtocols {
        match self {
            Self::Http2 => ServedProtocols::Http2Only,
            Self::Http1AndHttp2 | Self::Http1AndHttp2AndHttp3 => ServedProtocols::Both,
            Self::None | Self::Http1 | Self::Http3 => ServedProtocols::Http1Only,
        }
    }

    /// True when reducing the set had to fall back to HTTP/1.1
    pub const fn falls_back(self) -> bool {
        matches!(self, Self::None | Self::Http3)
    }
}

impl ServedProtocols {
    /// ALPN identifiers to advertise, most preferred first
    pub fn alpn(self) -> Vec<Vec<u8>> {
        match self {
            Self::Http1Only => vec![b"http/1.1".to_vec()],
            Self::Http2Only => vec![b"h2".to_vec()],
            Self::Both => vec![b"h2".to_vec(), b"http/1.1".to_vec()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http3_is_dropped() {
        assert_eq!(
            HttpProtocols::Http1AndHttp2AndHttp3.served(),
            ServedProtocols::Both
        );
        assert!(HttpProtocols::Http1AndHttp2AndHttp3.includes_http3());
        assert!(!HttpProtocols::Http1AndHttp2AndHttp3.falls_back());
    }

    #[test]
    fn test_unservable_sets_fall_back_to_http1() {
        for protocols in [HttpProtocols::None, HttpProtocols::Http3] {
            assert_eq!(protocols.served(), ServedProtocols::Http1Only);
            assert!(protocols.falls_back());
        }
    }

    #[test]
    fn test_alpn_order() {
        assert_eq!(
            ServedProtocols::Both.alpn(),
            vec![b"h2".to_vec(), b"http/1.1".to_vec()]
        );
        assert_eq!(ServedProtocols::Http2Only.alpn(), vec![b"h2".to_vec()]);
    }
}
