//! Interview screen states.

use ksync_core::session::SessionStatus;

/// The AI call currently awaited, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingCall {
    None,
    /// Waiting for the AI interviewer's next question.
    NextQuestion,
    /// Waiting for follow-up suggestions for a human interviewer.
    Suggestions,
}

/// Progress steps shown while an interview is turned into an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeStep {
    Analyzing,
    ExtractingHighlights,
    GeneratingArticle,
    Saving,
}

impl FinalizeStep {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Analyzing => "Analyzing the interview...",
            Self::ExtractingHighlights => "Extracting the overview, key points and cautions...",
            Self::GeneratingArticle => "Generating the knowledge article...",
            Self::Saving => "Saving...",
        }
    }
}

/// Why the last finalization attempt stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeFailure {
    pub message: String,
    /// Whether trying again without changes may succeed.
    pub retryable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterviewState {
    /// Collecting title, interviewee, category and mode.
    Setup,
    /// Conversation in progress.
    Chat {
        pending: PendingCall,
        /// Set when finalization failed; the transcript is untouched.
        failure: Option<FinalizeFailure>,
        /// Last save error while the newest messages exist only in memory.
        unsaved: Option<String>,
    },
    Finalizing { step: FinalizeStep },
    /// The article was saved and the session marked completed.
    Completed { article_id: String },
    /// Left the interview without finalizing.
    Exited { status: SessionStatus },
}

impl InterviewState {
    pub fn chat() -> Self {
        Self::Chat {
            pending: PendingCall::None,
            failure: None,
            unsaved: None,
        }
    }

    /// The save error when the transcript in storage is behind the one in memory.
    pub fn unsaved(&self) -> Option<&str> {
        match self {
            Self::Chat { unsaved, .. } => unsaved.as_deref(),
            _ => None,
        }
    }

    /// True in chat with no AI call outstanding.
    pub fn accepts_input(&self) -> bool {
        matches!(
            self,
            Self::Chat {
                pending: PendingCall::None,
                ..
            }
        )
    }

    /// True when a new interview may be set up or resumed.
    pub fn is_idle(&self) -> bool {
        matches!(
            self,
            Self::Setup | Self::Completed { .. } | Self::Exited { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Chat { .. } => "chat",
            Self::Finalizing { .. } => "finalizing",
            Self::Completed { .. } => "completed",
            Self::Exited { .. } => "exited",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_input_only_when_idle_chat() {
        assert!(InterviewState::chat().accepts_input());
        assert!(
            !InterviewState::Chat {
                pending: PendingCall::NextQuestion,
                failure: None,
                unsaved: None,
            }
            .accepts_input()
        );
        assert!(
            InterviewState::Chat {
                pending: PendingCall::None,
                failure: Some(FinalizeFailure {
                    message: "disk full".into(),
                    retryable: true
                }),
                unsaved: Some("disk full".into()),
            }
            .accepts_input()
        );
        assert!(!InterviewState::Setup.accepts_input());
        assert!(!InterviewState::Finalizing { step: FinalizeStep::Saving }.accepts_input());
    }
}
