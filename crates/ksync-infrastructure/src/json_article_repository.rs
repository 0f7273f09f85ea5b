//! JSON collection-backed ArticleRepository implementation.

use crate::storage::JsonCollectionFile;
use async_trait::async_trait;
use ksync_core::article::{ArticleRepository, KnowledgeArticle};
use ksync_core::{KsyncError, Result};
use std::path::Path;
use std::sync::Arc;

pub const ARTICLES_FILE: &str = "articles.json";

/// Stores every knowledge article in one `articles.json` array.
#[derive(Clone)]
pub struct JsonArticleRepository {
    file: Arc<JsonCollectionFile<KnowledgeArticle>>,
}

impl JsonArticleRepository {
    pub fn new(data_dir: impl AsRef<Path>, quota_bytes: Option<u64>) -> Self {
        let path = data_dir.as_ref().join(ARTICLES_FILE);
        Self {
            file: Arc::new(JsonCollectionFile::new(path, "articles").with_quota(quota_bytes)),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Writes `samples` if the collection file has never been created.
    ///
    /// Returns whether anything was written. An existing but empty collection
    /// is left alone, so deleting every article does not bring samples back.
    pub async fn seed_if_missing(&self, samples: Vec<KnowledgeArticle>) -> Result<bool> {
        let seeded = self
            .blocking(move |file| {
                if file.exists() {
                    return Ok(false);
                }
                file.replace(&samples)?;
                Ok(true)
            })
            .await?;
        if seeded {
            tracing::info!(path = %self.path().display(), "Seeded sample articles");
        }
        Ok(seeded)
    }

    async fn blocking<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&JsonCollectionFile<KnowledgeArticle>) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || f(file.as_ref()))
            .await
            .map_err(|e| KsyncError::internal(format!("storage task failed: {e}")))?
    }
}

#[async_trait]
impl ArticleRepository for JsonArticleRepository {
    async fn find_by_id(&self, article_id: &str) -> Result<Option<KnowledgeArticle>> {
        let id = article_id.to_string();
        self.blocking(move |file| Ok(file.load()?.into_iter().find(|a| a.id == id)))
            .await
    }

    async fn save(&self, article: &KnowledgeArticle) -> Result<()> {
        let article = article.clone();
        let article_id = article.id.clone();
        self.blocking(move |file| {
            file.update(|articles| {
                if articles.iter().any(|a| a.id == article.id) {
                    return Err(KsyncError::AlreadyExists {
                        entity_type: "Article",
                        id: article.id.clone(),
                    });
                }
                articles.push(article);
                Ok(())
            })
        })
        .await?;
        tracing::info!(article_id = %article_id, "Saved article");
        Ok(())
    }

    async fn update(&self, article: &KnowledgeArticle) -> Result<()> {
        let article = article.clone();
        self.blocking(move |file| {
            file.update(|articles| {
                let existing = articles
                    .iter_mut()
                    .find(|a| a.id == article.id)
                    .ok_or_else(|| KsyncError::not_found("Article", article.id.clone()))?;
                *existing = article;
                Ok(())
            })
        })
        .await
    }

    async fn delete(&self, article_id: &str) -> Result<()> {
        let id = article_id.to_string();
        self.blocking(move |file| {
            if !file.exists() {
                return Ok(());
            }
            file.update(|articles| {
                articles.retain(|a| a.id != id);
                Ok(())
            })
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<KnowledgeArticle>> {
        let mut articles = self.blocking(|file| file.load()).await?;
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(articles)
    }
}
