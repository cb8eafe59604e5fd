//! Typed configuration keys, addressed as `section.key`.

use std::path::PathBuf;
use std::str::FromStr;

use super::{ConfigError, ConfigFile};

/// A single setting in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    StorePath,
    BackupDirectory,
    BackupIntervalSecs,
    BackupRetention,
    LoggingDirectory,
    LoggingLevel,
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl ConfigKey {
    /// Every key, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::StorePath,
            ConfigKey::BackupDirectory,
            ConfigKey::BackupIntervalSecs,
            ConfigKey::BackupRetention,
            ConfigKey::LoggingDirectory,
            ConfigKey::LoggingLevel,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::StorePath => "store",
            ConfigKey::BackupDirectory
            | ConfigKey::BackupIntervalSecs
            | ConfigKey::BackupRetention => "backup",
            ConfigKey::LoggingDirectory | ConfigKey::LoggingLevel => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::StorePath => "path",
            ConfigKey::BackupDirectory => "directory",
            ConfigKey::BackupIntervalSecs => "interval_secs",
            ConfigKey::BackupRetention => "retention",
            ConfigKey::LoggingDirectory => "directory",
            ConfigKey::LoggingLevel => "level",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::StorePath => config.store.path.display().to_string(),
            ConfigKey::BackupDirectory => config.backup.directory.display().to_string(),
            ConfigKey::BackupIntervalSecs => config.backup.interval_secs.to_string(),
            ConfigKey::BackupRetention => config.backup.retention.to_string(),
            ConfigKey::LoggingDirectory => config
                .logging
                .directory
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
        }
    }

    /// Parse and store a value.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        match self {
            ConfigKey::StorePath => {
                if value.is_empty() {
                    return Err(invalid("path must not be empty"));
                }
                config.store.path = PathBuf::from(value);
            }
            ConfigKey::BackupDirectory => {
                if value.is_empty() {
                    return Err(invalid("path must not be empty"));
                }
                config.backup.directory = PathBuf::from(value);
            }
            ConfigKey::BackupIntervalSecs => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| invalid("expected a whole number of seconds"))?;
                if secs == 0 {
                    return Err(invalid("interval must be at least 1 second"));
                }
                config.backup.interval_secs = secs;
            }
            ConfigKey::BackupRetention => {
                config.backup.retention = value
                    .parse()
                    .map_err(|_| invalid("expected a non-negative count"))?;
            }
            ConfigKey::LoggingDirectory => {
                config.logging.directory = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            ConfigKey::LoggingLevel => {
                let level = value.to_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(invalid("expected one of trace, debug, info, warn, error"));
                }
                config.logging.level = level;
            }
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_key_name() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
        assert!("store.colour".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn test_set_and_get() {
        let mut config = ConfigFile::default();
        ConfigKey::BackupRetention.set(&mut config, "7").unwrap();
        assert_eq!(ConfigKey::BackupRetention.get(&config), "7");

        ConfigKey::LoggingLevel.set(&mut config, "DEBUG").unwrap();
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_logging_directory_can_be_cleared() {
        let mut config = ConfigFile::default();
        ConfigKey::LoggingDirectory.set(&mut config, "/tmp/logs").unwrap();
        assert!(config.logging.directory.is_some());
        ConfigKey::LoggingDirectory.set(&mut config, "").unwrap();
        assert!(config.logging.directory.is_none());
        assert_eq!(ConfigKey::LoggingDirectory.get(&config), "");
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::BackupIntervalSecs.set(&mut config, "0").is_err());
        assert!(ConfigKey::BackupIntervalSecs.set(&mut config, "-5").is_err());
        assert!(ConfigKey::LoggingLevel.set(&mut config, "loud").is_err());
        assert!(ConfigKey::StorePath.set(&mut config, "  ").is_err());
    }
}
