//! CLI error type.

use std::fmt;

use seisclean::backup::BackupError;
use seisclean::config::ConfigError;
use seisclean::logging::LoggingError;
use seisclean::store::StoreError;
use seisclean::CoreError;

/// Errors reported by CLI commands. Any of them exits non-zero.
#[derive(Debug)]
pub enum CliError {
    /// A core operation failed.
    Core(CoreError),

    /// The store could not be opened.
    Store(StoreError),

    /// Configuration file or argument problem.
    Config(String),

    /// Backup failed.
    Backup(BackupError),

    /// Logging could not be initialised.
    Logging(LoggingError),

    /// Output could not be produced.
    Output(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Core(e) => write!(f, "{}", e),
            CliError::Store(e) => write!(f, "Failed to open store: {}", e),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Backup(e) => write!(f, "Backup failed: {}", e),
            CliError::Logging(e) => write!(f, "Logging setup failed: {}", e),
            CliError::Output(msg) => write!(f, "Output error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Core(e) => Some(e),
            CliError::Store(e) => Some(e),
            CliError::Backup(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Config(_) | CliError::Output(_) => None,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(e: CoreError) -> Self {
        CliError::Core(e)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<BackupError> for CliError {
    fn from(e: BackupError) -> Self {
        CliError::Backup(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e.to_string())
    }
}
