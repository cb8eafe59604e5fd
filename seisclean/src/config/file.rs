//! INI-backed configuration values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use tracing::debug;

use super::{config_file_path, data_dir, ConfigError, ConfigKey};
use crate::backup::{BackupConfig, DEFAULT_BACKUP_INTERVAL, DEFAULT_BACKUP_RETENTION};
use crate::logging::{LoggingConfig, DEFAULT_LOG_LEVEL};

/// `[store]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub path: PathBuf,
}

/// `[backup]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSettings {
    pub directory: PathBuf,
    pub interval_secs: u64,
    pub retention: usize,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Directory for rolled log files. Unset logs to stderr only.
    pub directory: Option<PathBuf>,
    pub level: String,
}

/// The whole configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub store: StoreSettings,
    pub backup: BackupSettings,
    pub logging: LoggingSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let data = data_dir();
        Self {
            store: StoreSettings {
                path: data.join("store.json"),
            },
            backup: BackupSettings {
                directory: data.join("backups"),
                interval_secs: DEFAULT_BACKUP_INTERVAL.as_secs(),
                retention: DEFAULT_BACKUP_RETENTION,
            },
            logging: LoggingSettings {
                directory: None,
                level: DEFAULT_LOG_LEVEL.to_string(),
            },
        }
    }
}

impl ConfigFile {
    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)?;
        debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Start from defaults and apply every key present in `ini`.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Every key as an INI document. Unset optional keys are omitted.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        ini
    }

    pub fn backup_config(&self) -> BackupConfig {
        BackupConfig::new(&self.backup.directory)
            .with_interval(Duration::from_secs(self.backup.interval_secs))
            .with_retention(self.backup.retention)
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            directory: self.logging.directory.clone(),
            level: self.logging.level.clone(),
        }
    }
}
