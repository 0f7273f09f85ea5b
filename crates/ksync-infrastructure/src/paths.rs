//! Unified path management for ksync configuration and data files.
//!
//! Paths resolve in this order: explicit overrides, then `KSYNC_HOME`, then
//! the platform directories reported by `dirs`.

use ksync_core::config::StorageConfig;
use ksync_core::secret::{GeminiConfig, SecretConfig};
use ksync_core::{KsyncError, Result};
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "ksync";
pub const HOME_ENV: &str = "KSYNC_HOME";

/// Resolved locations of every file ksync touches.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/ksync/             # Config directory
/// ├── config.toml              # Application configuration
/// └── secret.json              # API keys
///
/// ~/.local/share/ksync/        # Data directory
/// ├── sessions.json            # Interview sessions
/// ├── articles.json            # Knowledge articles
/// ├── exports/                 # Rendered HTML / Markdown / text
/// └── logs/
///     └── ksync.log.YYYY-MM-DD
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KsyncPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl KsyncPaths {
    pub fn new(config_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            data_dir: data_dir.into(),
        }
    }

    /// Everything under one root, as used by `KSYNC_HOME`.
    pub fn under(home: impl AsRef<Path>) -> Self {
        let home = home.as_ref();
        Self::new(home, home.join("data"))
    }

    /// Resolves paths from overrides, `KSYNC_HOME` and the platform defaults.
    pub fn resolve(config_dir: Option<&Path>, data_dir: Option<&Path>) -> Result<Self> {
        let base = match std::env::var_os(HOME_ENV) {
            Some(home) if !home.is_empty() => Self::under(PathBuf::from(home)),
            _ => Self::platform()?,
        };

        Ok(Self {
            config_dir: config_dir.map(Path::to_path_buf).unwrap_or(base.config_dir),
            data_dir: data_dir.map(Path::to_path_buf).unwrap_or(base.data_dir),
        })
    }

    fn platform() -> Result<Self> {
        let config_root = dirs::config_dir()
            .ok_or_else(|| KsyncError::config("Cannot find config directory"))?;
        let data_root =
            dirs::data_dir().ok_or_else(|| KsyncError::config("Cannot find data directory"))?;
        Ok(Self::new(config_root.join(APP_NAME), data_root.join(APP_NAME)))
    }

    /// Applies `[storage] data_dir` unless an explicit override already won.
    pub fn with_storage_config(mut self, storage: &StorageConfig, data_overridden: bool) -> Self {
        if !data_overridden {
            if let Some(dir) = &storage.data_dir {
                self.data_dir = dir.clone();
            }
        }
        self
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Path to `secret.json`.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600) to prevent
    /// unauthorized access.
    pub fn secret_file(&self) -> PathBuf {
        self.config_dir.join("secret.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }

    /// Creates the config, data and log directories.
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }

    /// Ensures `secret.json` exists, writing an empty-key template if not.
    ///
    /// On Unix the new file is made readable by the owner only.
    pub fn ensure_secret_file(&self) -> Result<PathBuf> {
        let secret_path = self.secret_file();
        if secret_path.exists() {
            return Ok(secret_path);
        }

        if let Some(parent) = secret_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: String::new(),
                model_name: None,
            }),
        };
        std::fs::write(&secret_path, serde_json::to_string_pretty(&template)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&secret_path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(secret_path)
    }
}
