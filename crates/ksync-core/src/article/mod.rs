//! Knowledge article domain module.

mod model;
mod repository;
mod stats;

pub use model::{KnowledgeArticle, dedup_tags};
pub use repository::ArticleRepository;
pub use stats::{DashboardStats, TOP_TAG_LIMIT, TagCount};
