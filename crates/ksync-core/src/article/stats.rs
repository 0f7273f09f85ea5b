//! Dashboard statistics over sessions and articles.

use super::model::KnowledgeArticle;
use crate::session::{InterviewSession, SessionStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How many top tags the dashboard shows.
pub const TOP_TAG_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_sessions: usize,
    pub total_articles: usize,
    pub completed_sessions: usize,
    pub top_tags: Vec<TagCount>,
}

impl DashboardStats {
    pub fn compute(sessions: &[InterviewSession], articles: &[KnowledgeArticle]) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for tag in articles.iter().flat_map(|a| a.tags.iter()) {
            *counts.entry(tag.as_str()).or_default() += 1;
        }

        let mut top_tags: Vec<TagCount> = counts
            .into_iter()
            .map(|(tag, count)| TagCount {
                tag: tag.to_string(),
                count,
            })
            .collect();
        // Highest count first; ties by name so the order is stable.
        top_tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
        top_tags.truncate(TOP_TAG_LIMIT);

        Self {
            total_sessions: sessions.len(),
            total_articles: articles.len(),
            completed_sessions: sessions
                .iter()
                .filter(|s| s.status() == SessionStatus::Completed)
                .count(),
            top_tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn article(tags: &[&str]) -> KnowledgeArticle {
        KnowledgeArticle {
            id: uuid::Uuid::new_v4().to_string(),
            title: "t".into(),
            summary: "s".into(),
            overview: "o".into(),
            key_insights: vec![],
            planning_notes: vec![],
            execution_notes: vec![],
            tags: tags.iter().map(|t| t.to_string()).collect(),
            full_transcript: vec![],
            created_at: Utc::now(),
            author: "a".into(),
            category: "c".into(),
        }
    }

    #[test]
    fn test_top_tags_sorted_and_limited() {
        let articles = vec![
            article(&["sales", "negotiation"]),
            article(&["sales", "db"]),
            article(&["db", "sales", "risk", "ops", "cloud"]),
        ];

        let stats = DashboardStats::compute(&[], &articles);

        assert_eq!(stats.total_articles, 3);
        assert_eq!(stats.top_tags.len(), TOP_TAG_LIMIT);
        assert_eq!(stats.top_tags[0], TagCount { tag: "sales".into(), count: 3 });
        assert_eq!(stats.top_tags[1], TagCount { tag: "db".into(), count: 2 });
        // ties broken alphabetically
        assert_eq!(stats.top_tags[2].tag, "cloud");
    }

    #[test]
    fn test_empty_inputs() {
        let stats = DashboardStats::compute(&[], &[]);
        assert_eq!(stats, DashboardStats::default());
    }
}
