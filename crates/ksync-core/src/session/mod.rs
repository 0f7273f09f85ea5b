//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: Interview session entity (`InterviewSession`) and its status/mode
//! - `message`: Transcript message types (`MessageRole`, `Message`)
//! - `repository`: Repository trait for session persistence

mod message;
mod model;
mod repository;

pub use message::{Message, MessageRole, respondent_turns};
pub use model::{InterviewSession, SessionMode, SessionSetup, SessionStatus};
pub use repository::SessionRepository;
