//! Application configuration file.
//!
//! Settings live in an INI file at `<config dir>/seisclean/config.ini`:
//!
//! ```ini
//! [store]
//! path = /home/ops/.local/share/seisclean/store.json
//!
//! [backup]
//! directory = /home/ops/.local/share/seisclean/backups
//! interval_secs = 21600
//! retention = 14
//!
//! [logging]
//! directory = /home/ops/.local/share/seisclean/logs
//! level = info
//! ```
//!
//! A missing file or missing key falls back to the defaults below.

mod file;
mod keys;

pub use file::{BackupSettings, ConfigFile, LoggingSettings, StoreSettings};
pub use keys::ConfigKey;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Application directory name under the platform config/data dirs.
pub const APP_DIR: &str = "seisclean";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.ini";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("failed to write config {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Platform config directory for the application.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Full path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Platform data directory for the store, backups and logs.
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_path_ends_with_app_dir() {
        let path = config_file_path();
        assert!(path.ends_with("seisclean/config.ini"));
    }

    #[test]
    fn test_data_dir_ends_with_app_dir() {
        assert!(data_dir().ends_with(APP_DIR));
    }
}
