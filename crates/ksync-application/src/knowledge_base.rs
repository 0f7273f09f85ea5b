//! Read and maintenance queries over stored sessions and articles.

use ksync_core::article::{ArticleRepository, DashboardStats, KnowledgeArticle};
use ksync_core::session::{InterviewSession, SessionRepository};
use ksync_core::{KsyncError, Result};
use std::sync::Arc;

/// Dashboard and knowledge-base views.
#[derive(Clone)]
pub struct KnowledgeBase {
    sessions: Arc<dyn SessionRepository>,
    articles: Arc<dyn ArticleRepository>,
}

impl KnowledgeBase {
    pub fn new(sessions: Arc<dyn SessionRepository>, articles: Arc<dyn ArticleRepository>) -> Self {
        Self { sessions, articles }
    }

    /// Articles whose title, summary or any tag contains `query`, newest first.
    ///
    /// Matching is case-insensitive; an empty query returns every article.
    pub async fn search_articles(&self, query: &str) -> Result<Vec<KnowledgeArticle>> {
        let mut articles = self.articles.list_all().await?;
        articles.retain(|a| a.matches(query));
        Ok(articles)
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let sessions = self.sessions.list_all().await?;
        let articles = self.articles.list_all().await?;
        Ok(DashboardStats::compute(&sessions, &articles))
    }

    pub async fn get_article(&self, article_id: &str) -> Result<KnowledgeArticle> {
        self.articles
            .find_by_id(article_id)
            .await?
            .ok_or_else(|| KsyncError::not_found("Article", article_id))
    }

    pub async fn update_article(&self, article: &KnowledgeArticle) -> Result<()> {
        self.articles.update(article).await
    }

    pub async fn delete_article(&self, article_id: &str) -> Result<()> {
        self.articles.delete(article_id).await?;
        tracing::info!(article_id, "Article deleted");
        Ok(())
    }

    /// Sessions, most recently updated first.
    pub async fn list_sessions(&self) -> Result<Vec<InterviewSession>> {
        self.sessions.list_all().await
    }

    /// Sessions that can be reopened (`Draft` or `InProgress`).
    pub async fn resumable_sessions(&self) -> Result<Vec<InterviewSession>> {
        let mut sessions = self.sessions.list_all().await?;
        sessions.retain(InterviewSession::is_resumable);
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryArticles, MemorySessions};
    use chrono::{Duration, Utc};
    use ksync_core::session::{SessionMode, SessionSetup, SessionStatus};

    fn article(id: &str, title: &str, tags: &[&str], age_secs: i64) -> KnowledgeArticle {
        KnowledgeArticle {
            id: id.to_string(),
            title: title.to_string(),
            summary: format!("Summary of {title}"),
            overview: String::new(),
            key_insights: vec!["insight".to_string()],
            planning_notes: vec![],
            execution_notes: vec![],
            tags: tags.iter().map(|t| t.to_string()).collect(),
            full_transcript: vec![],
            created_at: Utc::now() - Duration::seconds(age_secs),
            author: "Taro".to_string(),
            category: "Engineering".to_string(),
        }
    }

    fn session(status: SessionStatus) -> InterviewSession {
        let setup = SessionSetup::new("t", "Taro", "Engineering", SessionMode::AiInterviewer);
        let mut session = InterviewSession::from_setup(&setup).unwrap();
        match status {
            SessionStatus::Draft => {}
            SessionStatus::InProgress => session.start().unwrap(),
            SessionStatus::Completed => session.complete().unwrap(),
            SessionStatus::Archived => session.archive().unwrap(),
        }
        session
    }

    async fn knowledge_base(sessions: Vec<InterviewSession>) -> (KnowledgeBase, Arc<MemoryArticles>) {
        let store = MemorySessions::default();
        for s in &sessions {
            store.save(s).await.unwrap();
        }
        let articles = Arc::new(MemoryArticles::with(vec![
            article("a1", "Database cutover", &["Database", "Migration"], 300),
            article("a2", "Enterprise closing", &["Sales", "database"], 200),
            article("a3", "Onboarding", &["People"], 100),
        ]));
        (KnowledgeBase::new(Arc::new(store), articles.clone()), articles)
    }

    #[tokio::test]
    async fn test_search_matches_title_summary_and_tags() {
        let (kb, _) = knowledge_base(vec![]).await;

        let ids = |v: Vec<KnowledgeArticle>| v.into_iter().map(|a| a.id).collect::<Vec<_>>();
        assert_eq!(ids(kb.search_articles("DATABASE").await.unwrap()), ["a2", "a1"]);
        assert_eq!(ids(kb.search_articles("summary of onb").await.unwrap()), ["a3"]);
        assert_eq!(kb.search_articles("").await.unwrap().len(), 3);
        assert!(kb.search_articles("nothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_stats() {
        let (kb, _) = knowledge_base(vec![
            session(SessionStatus::Completed),
            session(SessionStatus::Draft),
        ])
        .await;

        let stats = kb.dashboard_stats().await.unwrap();

        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.completed_sessions, 1);
        assert_eq!(stats.total_articles, 3);
        assert_eq!(stats.top_tags.len(), 5);
    }

    #[tokio::test]
    async fn test_get_update_delete_article() {
        let (kb, articles) = knowledge_base(vec![]).await;

        let mut a1 = kb.get_article("a1").await.unwrap();
        a1.title = "Renamed".to_string();
        kb.update_article(&a1).await.unwrap();
        assert_eq!(kb.get_article("a1").await.unwrap().title, "Renamed");

        kb.delete_article("a1").await.unwrap();
        assert!(kb.get_article("a1").await.unwrap_err().is_not_found());
        assert_eq!(articles.all().len(), 2);
    }

    #[tokio::test]
    async fn test_resumable_sessions() {
        let (kb, _) = knowledge_base(vec![
            session(SessionStatus::Completed),
            session(SessionStatus::Draft),
            session(SessionStatus::InProgress),
            session(SessionStatus::Archived),
        ])
        .await;

        let resumable = kb.resumable_sessions().await.unwrap();

        assert_eq!(resumable.len(), 2);
        assert!(resumable.iter().all(InterviewSession::is_resumable));
        assert_eq!(kb.list_sessions().await.unwrap().len(), 4);
    }
}
