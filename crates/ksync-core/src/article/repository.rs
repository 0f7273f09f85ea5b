//! Article repository trait.

use super::model::KnowledgeArticle;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for knowledge article persistence.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    async fn find_by_id(&self, article_id: &str) -> Result<Option<KnowledgeArticle>>;

    /// Stores a new article.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if an article with the same ID is stored
    /// - `QuotaExceeded` if the storage budget is exhausted; stored data is
    ///   left untouched in that case
    async fn save(&self, article: &KnowledgeArticle) -> Result<()>;

    /// Replaces an existing article wholesale.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no article has the given ID.
    async fn update(&self, article: &KnowledgeArticle) -> Result<()>;

    /// Deletes an article. Deleting an unknown ID is not an error.
    async fn delete(&self, article_id: &str) -> Result<()>;

    /// Lists all articles, newest first.
    async fn list_all(&self) -> Result<Vec<KnowledgeArticle>>;
}
