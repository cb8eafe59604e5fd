//! Periodic, rotating store backups.
//!
//! Every tick the whole store is snapshotted into a gzip-compressed JSON
//! file named after the wall-clock time:
//!
//! ```text
//! <directory>/seisclean-backup-20240301-061500.json.gz
//! <directory>/seisclean-backup-20240301-121500.json.gz
//! ...
//! ```
//!
//! Names sort chronologically, so pruning keeps the last `retention` names.
//! A failed backup is logged and the timer keeps running.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::store::{Store, StoreError, StoreSnapshot};

/// File name prefix of every backup.
pub const BACKUP_PREFIX: &str = "seisclean-backup-";

/// File name suffix of every backup.
pub const BACKUP_SUFFIX: &str = ".json.gz";

/// Default time between backups.
pub const DEFAULT_BACKUP_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

/// Default number of backups kept.
pub const DEFAULT_BACKUP_RETENTION: usize = 14;

/// Result type for backup operations.
pub type BackupResult<T> = Result<T, BackupError>;

/// Errors raised while writing, reading or pruning backups.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("backup I/O error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to snapshot store: {0}")]
    Store(#[from] StoreError),

    #[error("invalid backup pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> BackupError + '_ {
    move |source| BackupError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Backup schedule and destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupConfig {
    pub directory: PathBuf,
    pub interval: Duration,
    /// Number of files kept after each run. Zero keeps everything.
    pub retention: usize,
}

impl BackupConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            interval: DEFAULT_BACKUP_INTERVAL,
            retention: DEFAULT_BACKUP_RETENTION,
        }
    }

    /// Set the backup interval (builder pattern).
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the retention count (builder pattern).
    pub fn with_retention(mut self, retention: usize) -> Self {
        self.retention = retention;
        self
    }
}

/// Writes store snapshots on a timer.
pub struct BackupService {
    store: Arc<dyn Store>,
    config: BackupConfig,
}

impl BackupService {
    pub fn new(store: Arc<dyn Store>, config: BackupConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &BackupConfig {
        &self.config
    }

    /// Write one backup now and prune old ones. Returns the new file.
    pub fn run_once(&self) -> BackupResult<PathBuf> {
        let snapshot = self.store.snapshot()?;
        let dir = &self.config.directory;
        fs::create_dir_all(dir).map_err(io_error(dir))?;

        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        let path = dir.join(format!("{}{}{}", BACKUP_PREFIX, stamp, BACKUP_SUFFIX));
        write_backup(&path, &snapshot)?;
        info!(
            path = %path.display(),
            events = snapshot.events.len(),
            projects = snapshot.projects.len(),
            "Backup written"
        );

        let removed = prune_backups(dir, self.config.retention)?;
        if removed > 0 {
            debug!(removed, "Pruned old backups");
        }
        Ok(path)
    }

    /// Spawn the backup timer on the current tokio runtime.
    ///
    /// The first backup is taken immediately. The task exits when `token`
    /// is cancelled.
    pub fn start(self: Arc<Self>, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(
                directory = %self.config.directory.display(),
                interval_secs = self.config.interval.as_secs(),
                retention = self.config.retention,
                "Backup service started"
            );

            loop {
                tokio::select! {
                    biased;

                    _ = token.cancelled() => break,

                    _ = ticker.tick() => {
                        let service = Arc::clone(&self);
                        match tokio::task::spawn_blocking(move || service.run_once()).await {
                            Ok(Ok(_)) => {}
                            Ok(Err(e)) => error!(error = %e, "Backup failed"),
                            Err(e) => error!(error = %e, "Backup task panicked"),
                        }
                    }
                }
            }

            info!("Backup service stopped");
        })
    }
}

fn write_backup(path: &Path, snapshot: &StoreSnapshot) -> BackupResult<()> {
    let bytes = snapshot.to_json()?;
    let tmp = path.with_extension("gz.tmp");

    let file = File::create(&tmp).map_err(io_error(&tmp))?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(&bytes).map_err(io_error(&tmp))?;
    encoder.finish().map_err(io_error(&tmp))?;

    fs::rename(&tmp, path).map_err(io_error(path))?;
    Ok(())
}

/// Read a backup file back into a snapshot.
pub fn read_backup(path: &Path) -> BackupResult<StoreSnapshot> {
    let file = File::open(path).map_err(io_error(path))?;
    let mut bytes = Vec::new();
    GzDecoder::new(file)
        .read_to_end(&mut bytes)
        .map_err(io_error(path))?;
    Ok(StoreSnapshot::from_json(&bytes)?)
}

/// Backup files in `dir`, oldest first.
pub fn list_backups(dir: &Path) -> BackupResult<Vec<PathBuf>> {
    let pattern = dir.join(format!("{}*{}", BACKUP_PREFIX, BACKUP_SUFFIX));
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable backup entry");
                None
            }
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Delete all but the newest `retention` backups. Returns the number deleted.
pub fn prune_backups(dir: &Path, retention: usize) -> BackupResult<usize> {
    if retention == 0 {
        return Ok(0);
    }
    let files = list_backups(dir)?;
    let excess = files.len().saturating_sub(retention);
    let mut removed = 0;
    for path in &files[..excess] {
        match fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove old backup"),
        }
    }
    Ok(removed)
}
