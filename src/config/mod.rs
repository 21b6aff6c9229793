// Configuration module entry point
// Loads configuration once at startup and builds the immutable application state

mod persist;
mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

// Re-export public types
pub use persist::{config_file_exists, persist_if_missing};
pub use state::AppState;
pub use types::{
    Config, HttpProtocols, LoggingConfig, PerformanceConfig, ServedProtocols, ServerConfig,
    TlsConfig,
};

/// Values given on the command line, applied over every other source
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub working_directory: Option<PathBuf>,
    pub port: Option<u16>,
}

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// Sources, lowest priority first: built-in defaults, the config file
    /// (toml/yaml/json, optional), `SERVER_*` environment variables (`__`
    /// separates sections, e.g. `SERVER_SERVER__PORT=9000`), then `overrides`.
    pub fn load_from(config_path: &str, overrides: &Overrides) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .set_default("server.working_directory", "./")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.https_port", 8443)?
            .set_default("server.protocols", "Http1AndHttp2AndHttp3")?
            .set_default("tls.enabled", true)?
            .set_default("tls.certificate_file", "./certificate/cert.pem")?
            .set_default("tls.certificate_key_file", "./certificate/key.pem")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "simple")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 30)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option(
                "server.working_directory",
                overrides
                    .working_directory
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .set_override_option("server.port", overrides.port.map(i64::from))?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    pub fn get_https_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.https_port)
            .parse()
            .map_err(|e| format!("Invalid HTTPS address: {e}"))
    }

    /// Whether an HTTPS listener should be attempted at all
    pub const fn https_requested(&self) -> bool {
        self.tls.enabled && self.server.https_port != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_in(dir: &tempfile::TempDir, overrides: &Overrides) -> Config {
        let path = dir.path().join("config");
        Config::load_from(path.to_str().unwrap(), overrides).unwrap()
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_in(&dir, &Overrides::default());
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.https_port, 8443);
        assert_eq!(cfg.server.working_directory, PathBuf::from("./"));
        assert_eq!(cfg.server.protocols, HttpProtocols::Http1AndHttp2AndHttp3);
        assert!(cfg.tls.enabled);
        assert_eq!(cfg.logging.access_log_format, "simple");
        assert!(cfg.https_requested());
    }

    #[test]
    fn test_file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[server]\nport = 9000\nhttps_port = 0\nprotocols = \"Http1\"\n",
        )
        .unwrap();

        let cfg = load_in(&dir, &Overrides::default());
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.protocols, HttpProtocols::Http1);
        assert!(!cfg.https_requested());
    }

    #[test]
    fn test_yaml_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.yml"),
            "server:\n  working_directory: /srv/files\n",
        )
        .unwrap();

        let cfg = load_in(&dir, &Overrides::default());
        assert_eq!(cfg.server.working_directory, PathBuf::from("/srv/files"));
    }

    #[test]
    fn test_cli_overrides_win() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[server]\nport = 9000\n").unwrap();

        let overrides = Overrides {
            working_directory: Some(PathBuf::from("/data")),
            port: Some(7000),
        };
        let cfg = load_in(&dir, &overrides);
        assert_eq!(cfg.server.port, 7000);
        assert_eq!(cfg.server.working_directory, PathBuf::from("/data"));
    }

    #[test]
    fn test_socket_addr() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_in(&dir, &Overrides::default());
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 8080);
        assert_eq!(cfg.get_https_socket_addr().unwrap().port(), 8443);
    }
}
