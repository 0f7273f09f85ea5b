//! The interview workflow: setup, conversation and finalization.

mod orchestrator;
mod state;

pub use orchestrator::{InterviewOrchestrator, RECORDING_STARTED, greeting};
pub use state::{FinalizeFailure, FinalizeStep, InterviewState, PendingCall};
