//! Application configuration model (`config.toml`).
//!
//! Every field has a default so a missing or partial file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KsyncConfig {
    pub ai: AiConfig,
    pub storage: StorageConfig,
    pub interview: InterviewConfig,
}

/// Settings for the remote text-generation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub model: String,
    pub base_url: String,
    /// Randomness for next-question generation.
    pub question_temperature: f32,
    /// Randomness for end-of-session analysis; lower for consistency.
    pub analysis_temperature: f32,
    pub question_max_output_tokens: u32,
    pub analysis_max_output_tokens: u32,
    pub request_timeout_secs: u64,
    pub retry: RetryConfig,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            question_temperature: 0.7,
            analysis_temperature: 0.5,
            question_max_output_tokens: 512,
            analysis_max_output_tokens: 4096,
            request_timeout_secs: 60,
            retry: RetryConfig::default(),
        }
    }
}

impl AiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Attempt `n` waits `n * base_delay_ms` before the next try.
    pub base_delay_ms: u64,
    /// Longest server `Retry-After` honored; a longer one falls back at once.
    pub max_retry_after_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_retry_after_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform data directory.
    pub data_dir: Option<PathBuf>,
    /// Maximum serialized size of one collection file, in bytes.
    pub quota_bytes: Option<u64>,
    /// Seed the article collection with samples when it does not exist yet.
    pub seed_sample_articles: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            quota_bytes: None,
            seed_sample_articles: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewConfig {
    /// Respondent turns required before finalization is allowed.
    pub min_respondent_turns: usize,
    /// Pause between finalization progress steps.
    pub finalize_step_delay_ms: u64,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            min_respondent_turns: 1,
            finalize_step_delay_ms: 800,
        }
    }
}

impl InterviewConfig {
    pub fn finalize_step_delay(&self) -> Duration {
        Duration::from_millis(self.finalize_step_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: KsyncConfig = toml::from_str(
            r#"
            [ai]
            model = "gemini-2.0-pro"

            [ai.retry]
            max_attempts = 5

            [interview]
            min_respondent_turns = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.ai.model, "gemini-2.0-pro");
        assert_eq!(config.ai.retry.max_attempts, 5);
        assert_eq!(config.ai.retry.base_delay_ms, 1000);
        assert_eq!(config.ai.retry.max_retry_after_ms, 30_000);
        assert_eq!(config.ai.question_temperature, 0.7);
        assert_eq!(config.interview.min_respondent_turns, 2);
        assert_eq!(config.interview.finalize_step_delay_ms, 800);
        assert!(config.storage.seed_sample_articles);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: KsyncConfig = toml::from_str("").unwrap();
        assert_eq!(config, KsyncConfig::default());
    }
}
