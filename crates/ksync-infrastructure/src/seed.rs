//! Sample articles written on first start.

use chrono::{Duration, Utc};
use ksync_core::article::KnowledgeArticle;

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Two worked examples so a fresh knowledge base is not empty.
pub fn sample_articles() -> Vec<KnowledgeArticle> {
    let now = Utc::now();
    vec![
        KnowledgeArticle {
            id: "kb-101".into(),
            title: "Avoiding trouble when migrating a legacy database".into(),
            summary: "The dual-write strategy and key checkpoints for moving from SQL Server \
                      to PostgreSQL without downtime."
                .into(),
            overview: "How a SQL Server 2008 to PostgreSQL migration was carried out with \
                       zero service downtime, and how the problems that came up were handled. \
                       The focus is on keeping data consistent and on the rollback plan."
                .into(),
            key_insights: lines(&[
                "Zero downtime requires a dual-write strategy.",
                "Keep the old system read-only for 48 hours after cutover so rollback is immediate.",
                "Do not underestimate collation differences; they corrupt text silently.",
            ]),
            planning_notes: lines(&[
                "Rehearse the migration with production-sized data and time every step.",
                "Verify beforehand that the application's DB driver works against both databases.",
                "Document the rollback triggers and agree on them with every stakeholder.",
            ]),
            execution_notes: lines(&[
                "Keep a dashboard of replication lag on screen for the whole migration.",
                "Scale the database instance up temporarily; CPU load spikes during the copy.",
                "Assign one person solely to watching error logs for unexpected query failures.",
            ]),
            tags: lines(&["Engineering", "Database", "Migration", "Risk management"]),
            full_transcript: Vec::new(),
            created_at: now - Duration::seconds(100_000),
            author: "Taro Yamada".into(),
            category: "Engineering".into(),
        },
        KnowledgeArticle {
            id: "kb-102".into(),
            title: "Closing enterprise deals".into(),
            summary: "Using an internal champion to get through large-company approval \
                      processes and sign on schedule."
                .into(),
            overview: "A practical guide to keeping enterprise proposals with many decision \
                       makers from stalling in review, from identifying the key people to \
                       running legal and security checks in parallel."
                .into(),
            key_insights: lines(&[
                "Find an internal champion early and ask them to sell inside the company.",
                "Treat discounts as a last resort and always trade them for a longer term or a public case study.",
                "Map the full approval chain, down to who signs, in the first proposal meeting.",
            ]),
            planning_notes: lines(&[
                "Learn the customer's fiscal year end and budgeting period and plan backwards from them.",
                "Legal review takes two weeks to a month, so submit the security questionnaire first.",
                "Research competitors' deployments and past failed rollouts of similar tools.",
            ]),
            execution_notes: lines(&[
                "When contact goes quiet, reach out with relevant industry news rather than a reminder.",
                "Ask for a direct meeting with legal to explain the intent of contract changes.",
                "Write the approval request template the champion will circulate internally.",
            ]),
            tags: lines(&["Sales", "Enterprise", "Negotiation"]),
            full_transcript: Vec::new(),
            created_at: now - Duration::seconds(50_000),
            author: "Hanako Sato".into(),
            category: "Sales".into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_are_complete() {
        let samples = sample_articles();
        assert_eq!(samples.len(), 2);
        for article in &samples {
            assert!(!article.title.is_empty());
            assert_eq!(article.key_insights.len(), 3);
            assert!(!article.tags.is_empty());
        }
        assert!(samples[1].created_at > samples[0].created_at);
    }
}
