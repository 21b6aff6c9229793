// Application state module
// Immutable per-process state shared by every request

use std::io;
use std::path::PathBuf;

use super::types::Config;
use crate::logger::AccessLogFormat;

/// Application state, built once at startup and never mutated
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Canonical working directory; every served path stays below it
    pub root: PathBuf,
    pub access_log_format: AccessLogFormat,
}

impl AppState {
    /// Resolve the working directory and freeze the configuration
    pub fn new(config: Config) -> io::Result<Self> {
        let configured = &config.server.working_directory;
        let root = configured.canonicalize().map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("working directory '{}': {e}", configured.display()),
            )
        })?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("working directory '{}' is not a directory", root.display()),
            ));
        }

        let access_log_format = AccessLogFormat::parse(&config.logging.access_log_format);

        Ok(Self {
            config,
            root,
            access_log_format,
        })
    }
}
