//! Result of analyzing a finished interview.

use serde::{Deserialize, Serialize};

/// Structured knowledge extracted from an interview transcript.
///
/// This is a transient value: it is never persisted itself, only used to
/// build a [`crate::article::KnowledgeArticle`]. Producers guarantee that
/// every field is populated (see [`AiAnalysisResult::is_complete`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysisResult {
    pub suggested_title: String,
    /// Short list-view summary.
    pub summary: String,
    /// Detailed background and context.
    pub overview: String,
    pub key_insights: Vec<String>,
    /// Things to watch for while planning or preparing.
    pub planning_notes: Vec<String>,
    /// Things to watch for while doing the work.
    pub execution_notes: Vec<String>,
    pub tags: Vec<String>,
}

impl AiAnalysisResult {
    /// True when every text field is non-blank and every list has at least
    /// one non-blank entry.
    pub fn is_complete(&self) -> bool {
        let text_ok = [&self.suggested_title, &self.summary, &self.overview]
            .iter()
            .all(|s| !s.trim().is_empty());
        let lists_ok = [
            &self.key_insights,
            &self.planning_notes,
            &self.execution_notes,
            &self.tags,
        ]
        .iter()
        .all(|list| list.iter().any(|item| !item.trim().is_empty()));
        text_ok && lists_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> AiAnalysisResult {
        AiAnalysisResult {
            suggested_title: "Title".into(),
            summary: "Summary".into(),
            overview: "Overview".into(),
            key_insights: vec!["one".into()],
            planning_notes: vec!["plan".into()],
            execution_notes: vec!["exec".into()],
            tags: vec!["tag".into()],
        }
    }

    #[test]
    fn test_is_complete() {
        assert!(complete().is_complete());

        let mut blank_list = complete();
        blank_list.planning_notes = vec!["  ".into()];
        assert!(!blank_list.is_complete());

        let mut blank_title = complete();
        blank_title.suggested_title.clear();
        assert!(!blank_title.is_complete());
    }

    #[test]
    fn test_uses_camel_case_wire_names() {
        let value = serde_json::to_value(complete()).unwrap();
        assert!(value.get("suggestedTitle").is_some());
        assert!(value.get("keyInsights").is_some());
        assert!(value.get("executionNotes").is_some());
    }
}
