//! Conversation message types.
//!
//! Messages are the unit of an interview transcript. They are created once and
//! never edited; the session only ever appends them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message in the interview transcript.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageRole {
    /// A question, asked either by the AI interviewer or by a human recorder.
    Interviewer,
    /// An answer from the person being interviewed.
    Respondent,
    /// Application notices such as "recording started".
    System,
    /// A suggested follow-up kept in the transcript.
    AiSuggestion,
}

impl MessageRole {
    /// Whether this role belongs in the conversation proper
    /// (as opposed to notices and suggestions).
    pub fn is_conversational(&self) -> bool {
        matches!(self, Self::Interviewer | Self::Respondent)
    }

    /// Human-readable speaker label used in transcripts and exports.
    pub fn speaker_label(&self) -> &'static str {
        match self {
            Self::Interviewer => "Interviewer",
            Self::Respondent => "Respondent",
            Self::System => "System",
            Self::AiSuggestion => "Suggestion",
        }
    }
}

/// A single immutable message in an interview transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier (UUID format)
    pub id: String,
    /// Who authored the message.
    pub role: MessageRole,
    /// The message text.
    pub content: String,
    /// When the message was created.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a message stamped with a fresh id and the current time.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn interviewer(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Interviewer, content)
    }

    pub fn respondent(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Respondent, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }
}

/// Counts the respondent turns in a transcript.
pub fn respondent_turns(messages: &[Message]) -> usize {
    messages
        .iter()
        .filter(|m| m.role == MessageRole::Respondent)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_serializes_snake_case() {
        let json = serde_json::to_string(&MessageRole::AiSuggestion).unwrap();
        assert_eq!(json, "\"ai_suggestion\"");
        assert_eq!(
            MessageRole::from_str("respondent").unwrap(),
            MessageRole::Respondent
        );
    }

    #[test]
    fn test_new_messages_get_distinct_ids() {
        let a = Message::respondent("one");
        let b = Message::respondent("one");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_respondent_turns() {
        let messages = vec![
            Message::interviewer("q1"),
            Message::respondent("a1"),
            Message::system("note"),
            Message::respondent("a2"),
        ];
        assert_eq!(respondent_turns(&messages), 2);
        assert_eq!(respondent_turns(&[]), 0);
    }
}
