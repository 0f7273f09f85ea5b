//! In-memory repositories for unit tests.

use async_trait::async_trait;
use ksync_core::article::{ArticleRepository, KnowledgeArticle};
use ksync_core::config::InterviewConfig;
use ksync_core::session::{InterviewSession, SessionRepository};
use ksync_core::{KsyncError, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn fast_config() -> InterviewConfig {
    InterviewConfig {
        min_respondent_turns: 1,
        finalize_step_delay_ms: 0,
    }
}

/// Consumes one scheduled failure, if any.
fn take_failure(counter: &AtomicUsize, collection: &str) -> Result<()> {
    let scheduled = counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if scheduled {
        Err(KsyncError::quota_exceeded(collection, "storage budget exhausted"))
    } else {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySessions {
    items: Mutex<HashMap<String, InterviewSession>>,
    failing_saves: AtomicUsize,
}

impl MemorySessions {
    pub fn fail_next_saves(&self, n: usize) {
        self.failing_saves.store(n, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn get(&self, id: &str) -> Option<InterviewSession> {
        self.items.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl SessionRepository for MemorySessions {
    async fn find_by_id(&self, session_id: &str) -> Result<Option<InterviewSession>> {
        Ok(self.get(session_id))
    }

    async fn save(&self, session: &InterviewSession) -> Result<()> {
        take_failure(&self.failing_saves, "sessions")?;
        self.items
            .lock()
            .unwrap()
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        self.items.lock().unwrap().remove(session_id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<InterviewSession>> {
        let mut all: Vec<_> = self.items.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(all)
    }
}

#[derive(Default)]
pub struct MemoryArticles {
    items: Mutex<Vec<KnowledgeArticle>>,
    failing_saves: AtomicUsize,
    save_calls: AtomicUsize,
}

impl MemoryArticles {
    pub fn with(articles: Vec<KnowledgeArticle>) -> Self {
        Self {
            items: Mutex::new(articles),
            ..Self::default()
        }
    }

    pub fn fail_next_saves(&self, n: usize) {
        self.failing_saves.store(n, Ordering::SeqCst);
    }

    /// Successful `save` calls so far.
    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn all(&self) -> Vec<KnowledgeArticle> {
        self.items.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArticleRepository for MemoryArticles {
    async fn find_by_id(&self, article_id: &str) -> Result<Option<KnowledgeArticle>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == article_id)
            .cloned())
    }

    async fn save(&self, article: &KnowledgeArticle) -> Result<()> {
        take_failure(&self.failing_saves, "articles")?;
        let mut items = self.items.lock().unwrap();
        if items.iter().any(|a| a.id == article.id) {
            return Err(KsyncError::AlreadyExists {
                entity_type: "Article",
                id: article.id.clone(),
            });
        }
        items.push(article.clone());
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update(&self, article: &KnowledgeArticle) -> Result<()> {
        let mut items = self.items.lock().unwrap();
        let slot = items
            .iter_mut()
            .find(|a| a.id == article.id)
            .ok_or_else(|| KsyncError::not_found("Article", &article.id))?;
        *slot = article.clone();
        Ok(())
    }

    async fn delete(&self, article_id: &str) -> Result<()> {
        self.items.lock().unwrap().retain(|a| a.id != article_id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<KnowledgeArticle>> {
        let mut all = self.all();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}
