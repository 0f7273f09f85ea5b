//! Interview session domain model.

use super::message::{Message, MessageRole, respondent_turns};
use crate::error::{KsyncError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an interview session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum SessionStatus {
    Draft,
    #[serde(rename = "In Progress")]
    #[strum(serialize = "In Progress")]
    InProgress,
    Completed,
    Archived,
}

/// How questions are produced during an interview.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionMode {
    /// The system generates each next question for a single respondent.
    AiInterviewer,
    /// A human interviewer transcribes both sides of a live conversation.
    ManualRecording,
}

impl SessionMode {
    /// Display name recorded as the session's interviewer.
    pub fn interviewer_name(&self) -> &'static str {
        match self {
            Self::AiInterviewer => "AI Interviewer",
            Self::ManualRecording => "Recorder",
        }
    }
}

/// Data collected on the setup screen before an interview starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSetup {
    pub title: String,
    pub interviewee: String,
    pub category: String,
    pub mode: SessionMode,
}

impl SessionSetup {
    pub fn new(
        title: impl Into<String>,
        interviewee: impl Into<String>,
        category: impl Into<String>,
        mode: SessionMode,
    ) -> Self {
        Self {
            title: title.into(),
            interviewee: interviewee.into(),
            category: category.into(),
            mode,
        }
    }

    /// Rejects setups with a blank title, interviewee or category.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("title", &self.title),
            ("interviewee", &self.interviewee),
            ("category", &self.category),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(KsyncError::validation(format!(
                "all fields are required; missing: {}",
                missing.join(", ")
            )))
        }
    }
}

/// An interview session and its transcript.
///
/// The transcript can only grow, and only while the session is
/// `InProgress`. Status changes go through the transition methods, which
/// refuse to move a session backwards out of `Completed` or `Archived`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    /// Unique session identifier (UUID format)
    pub id: String,
    pub title: String,
    /// The person whose knowledge is being captured.
    pub interviewee: String,
    /// Who asks the questions ("AI Interviewer" or "Recorder").
    pub interviewer: String,
    /// Topic of the interview, also used as the article category.
    pub category: String,
    status: SessionStatus,
    pub mode: SessionMode,
    messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InterviewSession {
    /// Creates a `Draft` session from a validated setup.
    pub fn from_setup(setup: &SessionSetup) -> Result<Self> {
        setup.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            title: setup.title.trim().to_string(),
            interviewee: setup.interviewee.trim().to_string(),
            interviewer: setup.mode.interviewer_name().to_string(),
            category: setup.category.trim().to_string(),
            status: SessionStatus::Draft,
            mode: setup.mode,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The transcript in conversation order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn respondent_turns(&self) -> usize {
        respondent_turns(&self.messages)
    }

    /// Appends a message to the transcript.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` unless the session is `InProgress`, and
    /// `Validation` for blank content.
    pub fn append_message(&mut self, message: Message) -> Result<&Message> {
        if self.status != SessionStatus::InProgress {
            return Err(KsyncError::invalid_state(format!(
                "cannot append to a session with status '{}'",
                self.status
            )));
        }
        if message.content.trim().is_empty() {
            return Err(KsyncError::validation("message content is empty"));
        }

        self.touch();
        self.messages.push(message);
        Ok(&self.messages[self.messages.len() - 1])
    }

    /// Convenience wrapper creating and appending a message.
    pub fn push(&mut self, role: MessageRole, content: impl Into<String>) -> Result<&Message> {
        self.append_message(Message::new(role, content))
    }

    /// Moves a `Draft` (or already running) session to `InProgress`.
    pub fn start(&mut self) -> Result<()> {
        self.transition(SessionStatus::InProgress, &[SessionStatus::Draft, SessionStatus::InProgress])
    }

    /// Parks the session as `Draft`, keeping its transcript as-is.
    pub fn mark_draft(&mut self) -> Result<()> {
        self.transition(SessionStatus::Draft, &[SessionStatus::Draft, SessionStatus::InProgress])
    }

    /// Marks the session `Completed`. After this the transcript is read-only.
    pub fn complete(&mut self) -> Result<()> {
        self.transition(
            SessionStatus::Completed,
            &[SessionStatus::Draft, SessionStatus::InProgress],
        )
    }

    pub fn archive(&mut self) -> Result<()> {
        self.transition(
            SessionStatus::Archived,
            &[
                SessionStatus::Draft,
                SessionStatus::InProgress,
                SessionStatus::Completed,
            ],
        )
    }

    /// Whether the session can be reopened for more conversation.
    pub fn is_resumable(&self) -> bool {
        matches!(self.status, SessionStatus::Draft | SessionStatus::InProgress)
    }

    fn transition(&mut self, to: SessionStatus, allowed_from: &[SessionStatus]) -> Result<()> {
        if !allowed_from.contains(&self.status) {
            return Err(KsyncError::invalid_state(format!(
                "session {} cannot move from '{}' to '{}'",
                self.id, self.status, to
            )));
        }
        if self.status != to {
            self.status = to;
            self.touch();
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
