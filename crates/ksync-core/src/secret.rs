//! Secret management service trait.
//!
//! Defines the interface for loading API credentials.

use serde::{Deserialize, Serialize};

/// Gemini API credentials as stored in `secret.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Optional model override; `config.toml` is used otherwise.
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Root of `secret.json`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

impl SecretConfig {
    /// The configured Gemini key, if it is present and non-blank.
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini
            .as_ref()
            .map(|g| g.api_key.trim())
            .filter(|key| !key.is_empty())
    }
}

/// Service for loading secret configuration.
///
/// # Security Note
///
/// Implementations should ensure that:
/// - Secret files have appropriate permissions (e.g., 600 on Unix)
/// - Secrets are never logged or exposed in error messages
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration.
    ///
    /// # Returns
    ///
    /// - `Ok(SecretConfig)`: Successfully loaded secrets (possibly empty)
    /// - `Err(String)`: Failed to load (error message must not contain secrets)
    async fn load_secrets(&self) -> Result<SecretConfig, String>;

    /// Checks if the secret file exists.
    async fn secret_file_exists(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_is_absent() {
        let config = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: "   ".into(),
                model_name: None,
            }),
        };
        assert_eq!(config.gemini_api_key(), None);
        assert_eq!(SecretConfig::default().gemini_api_key(), None);
    }

    #[test]
    fn test_parses_secret_json() {
        let config: SecretConfig =
            serde_json::from_str(r#"{"gemini": {"api_key": "k-123"}}"#).unwrap();
        assert_eq!(config.gemini_api_key(), Some("k-123"));
    }
}
