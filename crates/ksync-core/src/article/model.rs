//! Knowledge article domain model.

use crate::analysis::AiAnalysisResult;
use crate::session::{InterviewSession, Message};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reusable write-up produced from one finalized interview.
///
/// Articles are created once, at finalization, and afterwards are only
/// deleted or replaced wholesale. `full_transcript` is a by-value copy of
/// the session's messages; there is no link back to the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeArticle {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub overview: String,
    pub key_insights: Vec<String>,
    #[serde(default)]
    pub planning_notes: Vec<String>,
    #[serde(default)]
    pub execution_notes: Vec<String>,
    pub tags: Vec<String>,
    #[serde(default)]
    pub full_transcript: Vec<Message>,
    pub created_at: DateTime<Utc>,
    /// The interviewee whose knowledge the article captures.
    pub author: String,
    pub category: String,
}

impl KnowledgeArticle {
    /// Builds an article from an analysis result and the session it came from.
    pub fn from_analysis(analysis: AiAnalysisResult, session: &InterviewSession) -> Self {
        let overview = if analysis.overview.trim().is_empty() {
            analysis.summary.clone()
        } else {
            analysis.overview
        };

        Self {
            id: Uuid::new_v4().to_string(),
            title: analysis.suggested_title,
            summary: analysis.summary,
            overview,
            key_insights: analysis.key_insights,
            planning_notes: analysis.planning_notes,
            execution_notes: analysis.execution_notes,
            tags: dedup_tags(analysis.tags),
            full_transcript: session.messages().to_vec(),
            created_at: Utc::now(),
            author: session.interviewee.clone(),
            category: session.category.clone(),
        }
    }

    /// The article stored when analysis fails outright.
    ///
    /// Keeps the transcript so nothing from the interview is lost.
    pub fn analysis_failed(session: &InterviewSession) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: session.title.clone(),
            summary: "Analysis failed.".to_string(),
            overview: "Analysis failed. The transcript below was saved unchanged.".to_string(),
            key_insights: Vec::new(),
            planning_notes: Vec::new(),
            execution_notes: Vec::new(),
            tags: vec!["Error".to_string()],
            full_transcript: session.messages().to_vec(),
            created_at: Utc::now(),
            author: session.interviewee.clone(),
            category: session.category.clone(),
        }
    }

    /// Case-insensitive match against title, summary and tags.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.summary.to_lowercase().contains(&needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }

    /// Transcript messages that belong to the conversation itself.
    pub fn conversation(&self) -> impl Iterator<Item = &Message> {
        self.full_transcript
            .iter()
            .filter(|m| m.role.is_conversational())
    }
}

/// Removes blank and duplicate tags, keeping first-seen order.
pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MessageRole, SessionMode, SessionSetup};

    fn session_with_messages() -> InterviewSession {
        let setup = SessionSetup::new("DB cutover", "Taro", "Engineering", SessionMode::ManualRecording);
        let mut session = InterviewSession::from_setup(&setup).unwrap();
        session.start().unwrap();
        session.push(MessageRole::System, "recording started").unwrap();
        session.push(MessageRole::Interviewer, "How did you plan it?").unwrap();
        session.push(MessageRole::Respondent, "Dual writes.").unwrap();
        session
    }

    fn analysis() -> AiAnalysisResult {
        AiAnalysisResult {
            suggested_title: "Zero-downtime cutover".into(),
            summary: "Dual writes".into(),
            overview: "".into(),
            key_insights: vec!["Keep the old DB read-only".into()],
            planning_notes: vec![],
            execution_notes: vec![],
            tags: vec!["db".into(), "DB".into(), " ".into(), "migration".into()],
        }
    }

    #[test]
    fn test_from_analysis_copies_transcript_and_dedups_tags() {
        let session = session_with_messages();
        let article = KnowledgeArticle::from_analysis(analysis(), &session);

        assert_eq!(article.full_transcript.len(), session.messages().len());
        assert_eq!(article.tags, vec!["db".to_string(), "migration".to_string()]);
        assert_eq!(article.overview, "Dual writes");
        assert_eq!(article.author, "Taro");
        assert_eq!(article.category, "Engineering");
    }

    #[test]
    fn test_matches_title_summary_and_tags() {
        let session = session_with_messages();
        let article = KnowledgeArticle::from_analysis(analysis(), &session);

        assert!(article.matches("CUTOVER"));
        assert!(article.matches("dual"));
        assert!(article.matches("migra"));
        assert!(article.matches(""));
        assert!(!article.matches("sales"));
    }

    #[test]
    fn test_conversation_skips_system_messages() {
        let session = session_with_messages();
        let article = KnowledgeArticle::analysis_failed(&session);
        assert_eq!(article.conversation().count(), 2);
        assert_eq!(article.tags, vec!["Error".to_string()]);
    }
}
