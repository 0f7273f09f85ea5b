//! Application layer for ksync.
//!
//! Coordinates the domain, storage and AI crates into the interview
//! workflow, knowledge base queries and article export.

pub mod app;
pub mod export;
pub mod interview;
pub mod knowledge_base;

#[cfg(test)]
mod test_support;

pub use app::{AppOptions, KsyncApp};
pub use export::{ArticleExporter, ExportFormat, export_file_name};
pub use interview::{FinalizeFailure, FinalizeStep, InterviewOrchestrator, InterviewState, PendingCall};
pub use knowledge_base::KnowledgeBase;
