//! Configuration service implementation.
//!
//! Loads `KsyncConfig` from `config.toml` and caches it.

use ksync_core::config::KsyncConfig;
use ksync_core::{KsyncError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Configuration service that loads and caches the application configuration.
///
/// A missing file yields the defaults. A malformed file is reported as
/// `KsyncError::Config` rather than silently replaced.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<KsyncConfig>>>,
}

impl ConfigService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<KsyncConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        {
            let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = None;
    }

    /// Writes the default configuration if no file exists yet.
    ///
    /// Returns whether a file was written.
    pub fn ensure_config_file(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&KsyncConfig::default())?;
        std::fs::write(&self.path, content)?;
        tracing::info!(path = %self.path.display(), "Wrote default configuration");
        Ok(true)
    }

    fn load_config(&self) -> Result<KsyncConfig> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No config file, using defaults");
            return Ok(KsyncConfig::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| {
            KsyncError::config(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e.message()
            ))
        })
    }
}
