//! Error types for the ksync workspace.

use thiserror::Error;

/// A shared error type for the whole ksync workspace.
///
/// Repositories, services and the interview orchestrator all report failures
/// through this type. The AI gateway never returns it to callers: remote-call
/// failures are absorbed into fallback content there.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KsyncError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// The storage backend refused a write because it ran out of space.
    #[error("Storage quota exceeded for '{collection}': {message}")]
    QuotaExceeded { collection: String, message: String },

    /// Input rejected before any state change.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation not allowed in the current interview state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// An entity with the same id already exists.
    #[error("Entity already exists: {entity_type} '{id}'")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl KsyncError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a QuotaExceeded error
    pub fn quota_exceeded(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::QuotaExceeded {
            collection: collection.into(),
            message: message.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an InvalidState error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a storage quota error
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Whether repeating the failed operation later can succeed.
    ///
    /// Storage and I/O failures are transient from the user's point of view
    /// (free some space, fix permissions, try again). Validation and state
    /// errors will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::QuotaExceeded { .. } | Self::Internal(_)
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for KsyncError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match err.kind() {
            ErrorKind::StorageFull | ErrorKind::QuotaExceeded => Self::QuotaExceeded {
                collection: "unknown".to_string(),
                message: err.to_string(),
            },
            kind => Self::Io {
                message: format!("{} (kind: {:?})", err, kind),
            },
        }
    }
}

impl From<serde_json::Error> for KsyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for KsyncError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for KsyncError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error for infrastructure code that uses `context`.
impl From<anyhow::Error> for KsyncError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<KsyncError>() {
            Ok(inner) => inner,
            Err(err) => Self::Internal(format!("{:#}", err)),
        }
    }
}

/// A type alias for `Result<T, KsyncError>`.
pub type Result<T> = std::result::Result<T, KsyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_full_maps_to_quota() {
        let err = std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full");
        let converted: KsyncError = err.into();
        assert!(converted.is_quota_exceeded());
        assert!(converted.is_retryable());
    }

    #[test]
    fn test_other_io_errors_stay_io() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let converted: KsyncError = err.into();
        assert!(matches!(converted, KsyncError::Io { .. }));
    }

    #[test]
    fn test_anyhow_round_trips_typed_error() {
        let original = KsyncError::not_found("session", "abc");
        let wrapped = anyhow::Error::new(original.clone());
        assert_eq!(KsyncError::from(wrapped), original);
    }

    #[test]
    fn test_validation_is_not_retryable() {
        assert!(!KsyncError::validation("empty title").is_retryable());
        assert!(!KsyncError::invalid_state("finalizing").is_retryable());
    }
}
