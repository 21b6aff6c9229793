// Configuration persistence module
// Writes the effective configuration out on first run so operators have a file to edit

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::types::Config;

/// Extensions the `config` crate recognizes for a file source
const CONFIG_EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

/// Check whether any configuration file exists for `config_path`
pub fn config_file_exists(config_path: &str) -> bool {
    let path = Path::new(config_path);
    path.is_file()
        || CONFIG_EXTENSIONS
            .iter()
            .any(|ext| path.with_extension(ext).is_file())
}

/// Write `config` to `{config_path}.toml` unless a configuration file exists
///
/// Returns the written path, or `None` when a file was already present.
pub fn persist_if_missing(config: &Config, config_path: &str) -> io::Result<Option<PathBuf>> {
    if config_file_exists(config_path) {
        return Ok(None);
    }

    let target = Path::new(config_path).with_extension("toml");
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = toml::to_string_pretty(config).map_err(io::Error::other)?;
    fs::write(&target, content)?;
    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Overrides;

    #[test]
    fn test_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("config");
        let base = base.to_str().unwrap();

        let cfg = Config::load_from(base, &Overrides::default()).unwrap();
        let written = persist_if_missing(&cfg, base).unwrap();
        assert_eq!(written, Some(dir.path().join("config.toml")));
        assert!(config_file_exists(base));

        // Second run leaves the file alone
        assert_eq!(persist_if_missing(&cfg, base).unwrap(), None);
    }

    #[test]
    fn test_written_file_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("config");
        let base = base.to_str().unwrap();

        let overrides = Overrides {
            working_directory: None,
            port: Some(9123),
        };
        let cfg = Config::load_from(base, &overrides).unwrap();
        persist_if_missing(&cfg, base).unwrap();

        let reloaded = Config::load_from(base, &Overrides::default()).unwrap();
        assert_eq!(reloaded.server.port, 9123);
        assert_eq!(reloaded.server.protocols, cfg.server.protocols);
    }

    #[test]
    fn test_existing_yaml_counts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.yml"), "server:\n  port: 81\n").unwrap();
        let base = dir.path().join("config");
        assert!(config_file_exists(base.to_str().unwrap()));
    }
}
