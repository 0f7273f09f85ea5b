//! JSON collection-backed SessionRepository implementation.

use crate::storage::JsonCollectionFile;
use async_trait::async_trait;
use ksync_core::session::{InterviewSession, SessionRepository};
use ksync_core::{KsyncError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const SESSIONS_FILE: &str = "sessions.json";

/// Stores every session in one `sessions.json` array.
///
/// Directory structure:
/// ```text
/// data_dir/
/// ├── sessions.json
/// └── sessions.lock
/// ```
#[derive(Clone)]
pub struct JsonSessionRepository {
    file: Arc<JsonCollectionFile<InterviewSession>>,
}

impl JsonSessionRepository {
    /// Creates a repository in `data_dir`, with an optional byte quota.
    pub fn new(data_dir: impl AsRef<Path>, quota_bytes: Option<u64>) -> Self {
        let path: PathBuf = data_dir.as_ref().join(SESSIONS_FILE);
        Self {
            file: Arc::new(JsonCollectionFile::new(path, "sessions").with_quota(quota_bytes)),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Runs blocking file work off the async runtime.
    async fn blocking<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&JsonCollectionFile<InterviewSession>) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || f(file.as_ref()))
            .await
            .map_err(|e| KsyncError::internal(format!("storage task failed: {e}")))?
    }
}

#[async_trait]
impl SessionRepository for JsonSessionRepository {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<InterviewSession>> {
        let id = session_id.to_string();
        self.blocking(move |file| Ok(file.load()?.into_iter().find(|s| s.id == id)))
            .await
    }

    async fn save(&self, session: &InterviewSession) -> Result<()> {
        let session = session.clone();
        let session_id = session.id.clone();
        self.blocking(move |file| {
            file.update(|sessions| {
                match sessions.iter_mut().find(|s| s.id == session.id) {
                    Some(existing) => *existing = session,
                    None => sessions.push(session),
                }
                Ok(())
            })
        })
        .await?;
        tracing::debug!(session_id = %session_id, "Saved session");
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let id = session_id.to_string();
        self.blocking(move |file| {
            if !file.exists() {
                return Ok(());
            }
            file.update(|sessions| {
                sessions.retain(|s| s.id != id);
                Ok(())
            })
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<InterviewSession>> {
        let mut sessions = self.blocking(|file| file.load()).await?;
        // Sort by updated_at descending (most recent first)
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ksync_core::session::{MessageRole, SessionMode, SessionSetup, SessionStatus};
    use tempfile::TempDir;

    fn create_test_session(title: &str) -> InterviewSession {
        let setup = SessionSetup::new(title, "Hanako", "Sales", SessionMode::ManualRecording);
        let mut session = InterviewSession::from_setup(&setup).unwrap();
        session.start().unwrap();
        session.push(MessageRole::System, "Recording started.").unwrap();
        session
    }

    #[tokio::test]
    async fn test_save_and_find_by_id() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonSessionRepository::new(temp_dir.path(), None);
        let session = create_test_session("Closing deals");

        repository.save(&session).await.unwrap();

        let loaded = repository.find_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded, session);
        assert!(repository.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_upserts() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonSessionRepository::new(temp_dir.path(), None);
        let mut session = create_test_session("Closing deals");
        repository.save(&session).await.unwrap();

        session.push(MessageRole::Interviewer, "Who signs off?").unwrap();
        session.complete().unwrap();
        repository.save(&session).await.unwrap();

        let all = repository.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status(), SessionStatus::Completed);
        assert_eq!(all[0].messages().len(), 2);
    }

    #[tokio::test]
    async fn test_list_all_most_recent_first() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonSessionRepository::new(temp_dir.path(), None);
        let older = create_test_session("older");
        let mut newer = create_test_session("newer");
        newer.push(MessageRole::Interviewer, "touch").unwrap();

        repository.save(&newer).await.unwrap();
        repository.save(&older).await.unwrap();

        let titles: Vec<String> = repository
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["newer".to_string(), "older".to_string()]);
    }

    #[tokio::test]
    async fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let repository = JsonSessionRepository::new(temp_dir.path(), None);
        let session = create_test_session("to delete");
        repository.save(&session).await.unwrap();

        repository.delete(&session.id).await.unwrap();
        repository.delete("never-existed").await.unwrap();

        assert!(repository.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_quota_exceeded_leaves_stored_session() {
        let temp_dir = TempDir::new().unwrap();
        let unlimited = JsonSessionRepository::new(temp_dir.path(), None);
        let mut session = create_test_session("quota");
        unlimited.save(&session).await.unwrap();
        let size = std::fs::metadata(unlimited.path()).unwrap().len();

        let limited = JsonSessionRepository::new(temp_dir.path(), Some(size + 10));
        session
            .push(MessageRole::Respondent, "a long answer ".repeat(20))
            .unwrap();
        let err = limited.save(&session).await.unwrap_err();

        assert!(err.is_quota_exceeded());
        let stored = limited.find_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.messages().len(), 1);
    }
}
