//! Broker settings: CLI flags layered over an optional TOML file.
//!
//! This only configures the Broker binary itself (address, static
//! root, preferences path). The preferences blob served at `/api/prefs`
//! stays opaque — this crate never parses it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Broker settings, as loaded from an optional `simpi-broker.toml`.
/// Every field is optional since CLI flags (or their hardcoded
/// defaults) always supply a value; see [`crate::cli::Args`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<PathBuf>,
    pub prefs_path: Option<PathBuf>,
}

impl FileConfig {
    /// Load settings from `path` if it exists; a missing file is not an
    /// error; a malformed one is.
    pub fn load(path: &Path) -> Result<FileConfig, ConfigError> {
        if !path.exists() {
            return Ok(FileConfig::default());
        }
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&text).map_err(ConfigError::Parse)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config file: {e}"),
            ConfigError::Parse(e) => write!(f, "failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// The platform app-data directory's preferences file:
/// `$APPDATA/simpi/preferences.json` on Windows, `$HOME/.simpi/preferences.json`
/// elsewhere.
pub fn default_prefs_path() -> PathBuf {
    #[cfg(windows)]
    {
        let appdata = std::env::var_os("APPDATA").unwrap_or_default();
        PathBuf::from(appdata).join("simpi").join("preferences.json")
    }
    #[cfg(not(windows))]
    {
        let home = std::env::var_os("HOME").unwrap_or_default();
        PathBuf::from(home).join(".simpi").join("preferences.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = FileConfig::load(Path::new("/nonexistent/simpi-broker.toml")).unwrap();
        assert!(config.host.is_none());
        assert!(config.port.is_none());
    }
}
