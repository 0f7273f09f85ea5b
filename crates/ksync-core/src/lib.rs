//! Domain model for ksync, a tacit knowledge extraction engine.
//!
//! Interviews are recorded as [`session::InterviewSession`]s, analyzed into
//! an [`analysis::AiAnalysisResult`] and stored as
//! [`article::KnowledgeArticle`]s. Storage is reached only through the
//! repository traits defined here.

pub mod analysis;
pub mod article;
pub mod config;
pub mod error;
pub mod secret;
pub mod session;

// Re-export common error type
pub use error::{KsyncError, Result};
