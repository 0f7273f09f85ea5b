//! Session repository trait.
//!
//! Defines the interface for session persistence operations.

use super::model::InterviewSession;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for managing interview session persistence.
///
/// This trait decouples the orchestrator from the specific storage mechanism
/// (JSON collection files, embedded database, remote API).
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds a session by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(InterviewSession))`: Session found
    /// - `Ok(None)`: Session not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, session_id: &str) -> Result<Option<InterviewSession>>;

    /// Inserts or replaces a session, keyed by its ID.
    ///
    /// # Errors
    ///
    /// Implementations report an exhausted storage budget as
    /// `KsyncError::QuotaExceeded` and must leave previously stored data intact.
    async fn save(&self, session: &InterviewSession) -> Result<()>;

    /// Deletes a session from storage.
    ///
    /// Deleting an unknown ID is not an error.
    async fn delete(&self, session_id: &str) -> Result<()>;

    /// Lists all stored sessions, most recently updated first.
    async fn list_all(&self) -> Result<Vec<InterviewSession>>;
}
