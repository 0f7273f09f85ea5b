//! Secret service implementation.
//!
//! The Gemini key comes from the environment (`GEMINI_API_KEY`, then
//! `API_KEY`) and otherwise from `secret.json`.

use ksync_core::secret::{GeminiConfig, SecretConfig, SecretService};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Service for loading secret configuration.
///
/// The result is cached after the first successful load.
///
/// # Example
///
/// ```ignore
/// use ksync_infrastructure::{KsyncPaths, SecretServiceImpl};
/// use ksync_core::secret::SecretService;
///
/// let paths = KsyncPaths::resolve(None, None)?;
/// let service = SecretServiceImpl::new(paths.secret_file());
/// let secrets = service.load_secrets().await?;
/// ```
#[derive(Clone)]
pub struct SecretServiceImpl {
    secret_file: PathBuf,
    env: EnvLookup,
    secrets: Arc<RwLock<Option<SecretConfig>>>,
}

impl SecretServiceImpl {
    pub fn new(secret_file: impl Into<PathBuf>) -> Self {
        Self::with_env_lookup(secret_file, |name| std::env::var(name).ok())
    }

    /// Uses `lookup` instead of the process environment.
    pub fn with_env_lookup<F>(secret_file: impl Into<PathBuf>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            secret_file: secret_file.into(),
            env: Arc::new(lookup),
            secrets: Arc::new(RwLock::new(None)),
        }
    }

    fn env_api_key(&self) -> Option<String> {
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| (self.env)(name))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
    }

    fn read_secret_file(&self) -> Result<SecretConfig, String> {
        if !self.secret_file.exists() {
            return Ok(SecretConfig::default());
        }
        let content = std::fs::read_to_string(&self.secret_file)
            .map_err(|e| format!("Failed to read {}: {}", self.secret_file.display(), e))?;
        if content.trim().is_empty() {
            return Ok(SecretConfig::default());
        }
        // serde_json errors quote input, so only the position is reported.
        serde_json::from_str(&content).map_err(|e| {
            format!(
                "Failed to parse {} at line {}, column {}",
                self.secret_file.display(),
                e.line(),
                e.column()
            )
        })
    }

    fn load_secrets_internal(&self) -> Result<SecretConfig, String> {
        {
            let read_lock = self.secrets.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let from_file = self.read_secret_file();
        let loaded = match (self.env_api_key(), from_file) {
            (Some(api_key), Ok(mut config)) => {
                let model_name = config.gemini.take().and_then(|g| g.model_name);
                config.gemini = Some(GeminiConfig {
                    api_key,
                    model_name,
                });
                config
            }
            (Some(api_key), Err(message)) => {
                tracing::warn!("{}; using API key from environment", message);
                SecretConfig {
                    gemini: Some(GeminiConfig {
                        api_key,
                        model_name: None,
                    }),
                }
            }
            (None, result) => result?,
        };

        {
            let mut write_lock = self.secrets.write().unwrap_or_else(PoisonError::into_inner);
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig, String> {
        self.load_secrets_internal()
    }

    async fn secret_file_exists(&self) -> bool {
        self.secret_file.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn service_with_env(path: PathBuf, vars: &[(&str, &str)]) -> SecretServiceImpl {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SecretServiceImpl::with_env_lookup(path, move |name| vars.get(name).cloned())
    }

    #[tokio::test]
    async fn test_no_env_no_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_with_env(temp_dir.path().join("secret.json"), &[]);

        let secrets = service.load_secrets().await.unwrap();

        assert_eq!(secrets.gemini_api_key(), None);
        assert!(!service.secret_file_exists().await);
    }

    #[tokio::test]
    async fn test_gemini_env_var_takes_precedence() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        std::fs::write(
            &path,
            r#"{"gemini": {"api_key": "from-file", "model_name": "gemini-2.0-pro"}}"#,
        )
        .unwrap();
        let service = service_with_env(
            path,
            &[("GEMINI_API_KEY", "from-env"), ("API_KEY", "generic")],
        );

        let secrets = service.load_secrets().await.unwrap();

        assert_eq!(secrets.gemini_api_key(), Some("from-env"));
        let gemini = secrets.gemini.unwrap();
        assert_eq!(gemini.model_name.as_deref(), Some("gemini-2.0-pro"));
    }

    #[tokio::test]
    async fn test_api_key_env_var_is_second_choice() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_with_env(
            temp_dir.path().join("secret.json"),
            &[("GEMINI_API_KEY", "  "), ("API_KEY", "generic")],
        );

        let secrets = service.load_secrets().await.unwrap();

        assert_eq!(secrets.gemini_api_key(), Some("generic"));
    }

    #[tokio::test]
    async fn test_malformed_file_error_does_not_leak_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        std::fs::write(&path, r#"{"gemini": {"api_key": "sk-secret-value""#).unwrap();
        let service = service_with_env(path, &[]);

        let message = service.load_secrets().await.unwrap_err();

        assert!(!message.contains("sk-secret-value"));
    }
}
