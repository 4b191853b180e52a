//! Transactional backup of `.ecos.yaml` around destroy
//!
//! The config file is moved aside immediately before the first mutating
//! call. If the guard is dropped without [`ConfigBackup::keep`], the file
//! is moved back.

use crate::error::LifecycleError;
use std::path::{Path, PathBuf};
use tokio::fs;

const BACKUP_SUFFIX: &str = ".backup";

/// Backup path for a config file: `<file>.backup` next to it.
pub fn backup_path(config_path: &Path) -> PathBuf {
    let mut name = config_path.as_os_str().to_owned();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// RAII guard over a moved-aside config file.
#[derive(Debug)]
pub struct ConfigBackup {
    config_path: PathBuf,
    backup_path: PathBuf,
    armed: bool,
}

impl ConfigBackup {
    /// Atomically rename `config_path` to its backup path.
    pub async fn create(config_path: &Path) -> Result<Self, LifecycleError> {
        let backup_path = backup_path(config_path);
        fs::rename(config_path, &backup_path)
            .await
            .map_err(|source| LifecycleError::Backup {
                path: config_path.to_path_buf(),
                source,
            })?;
        tracing::debug!(backup = %backup_path.display(), "config moved to backup");
        Ok(Self {
            config_path: config_path.to_path_buf(),
            backup_path,
            armed: true,
        })
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Move the backup back into place. No-op if it is already gone.
    pub async fn restore(mut self) -> Result<(), LifecycleError> {
        self.armed = false;
        if fs::metadata(&self.backup_path).await.is_err() {
            return Ok(());
        }
        fs::rename(&self.backup_path, &self.config_path)
            .await
            .map_err(|source| LifecycleError::Restore {
                path: self.backup_path.clone(),
                source,
            })?;
        tracing::debug!(config = %self.config_path.display(), "config restored from backup");
        Ok(())
    }

    /// Leave the config absent and keep the backup for recovery.
    pub fn keep(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.backup_path)
    }
}

impl Drop for ConfigBackup {
    fn drop(&mut self) {
        if self.armed && self.backup_path.exists() {
            if let Err(e) = std::fs::rename(&self.backup_path, &self.config_path) {
                tracing::warn!(
                    backup = %self.backup_path.display(),
                    error = %e,
                    "config backup could not be restored"
                );
            }
        }
    }
}
