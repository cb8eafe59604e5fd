//! Shared setup for commands that touch the store.

use std::path::PathBuf;
use std::sync::Arc;

use seisclean::config::ConfigFile;
use seisclean::logging::{init_logging, WorkerGuard};
use seisclean::{AccessScope, CleaningService, JsonStore, Store};
use tracing::{info, warn};

use crate::error::CliError;

/// Caller identity and store location taken from global flags.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub store: Option<PathBuf>,
    pub scope: AccessScope,
}

/// Loaded configuration, logging, store and service for one invocation.
pub struct CliRunner {
    config: ConfigFile,
    scope: AccessScope,
    service: CleaningService,
    _log_guard: Option<WorkerGuard>,
}

impl CliRunner {
    pub fn new(globals: &GlobalArgs) -> Result<Self, CliError> {
        let (config, config_warning) = match ConfigFile::load() {
            Ok(config) => (config, None),
            Err(e) => (ConfigFile::default(), Some(e)),
        };
        let log_guard = init_logging(&config.logging_config())?;
        if let Some(e) = config_warning {
            warn!(error = %e, "Config file unreadable, using defaults");
        }

        let store_path = globals
            .store
            .clone()
            .unwrap_or_else(|| config.store.path.clone());
        let store: Arc<dyn Store> = Arc::new(JsonStore::open(&store_path)?);

        Ok(Self {
            config,
            scope: globals.scope.clone(),
            service: CleaningService::new(store),
            _log_guard: log_guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn scope(&self) -> &AccessScope {
        &self.scope
    }

    pub fn service(&self) -> &CleaningService {
        &self.service
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = seisclean::VERSION,
            command,
            scope = %self.scope,
            "seisclean starting"
        );
    }
}
