//! Deterministic local content used when the model is unavailable.

use crate::transcript::excerpt;
use ksync_core::analysis::AiAnalysisResult;
use rand::seq::SliceRandom;

/// Returned by `generate_next_question` when no API key is configured.
pub const UNCONFIGURED_QUESTION: &str = "Thank you. Could you tell me more about that? \
    (AI question generation is off because no API key is configured. Check your settings.)";

/// Appended to canned questions so the degraded reply is visible in the transcript.
pub const DEGRADED_QUESTION_NOTE: &str = "(fallback question: AI service unavailable)";

/// Probing questions that work at any point of an interview.
pub const CANNED_QUESTIONS: [&str; 5] = [
    "Could you walk me through a specific time this happened?",
    "What made you decide that? What were you looking at when you made the call?",
    "Has this ever gone wrong? What did you learn from it?",
    "If a newcomer had to do this tomorrow, what would you warn them about first?",
    "Is there a rule of thumb you follow here that isn't written down anywhere?",
];

pub const FALLBACK_SUGGESTIONS: [&str; 3] = [
    "Could you give a concrete example?",
    "Why did you decide it that way?",
    "What would you do differently next time?",
];

/// Analyses of transcripts shorter than this many respondent turns skip the model.
pub const MIN_RESPONDENT_TURNS_FOR_ANALYSIS: usize = 2;

pub const OVERVIEW_EXCERPT_CHARS: usize = 500;

const NEEDS_REVIEW_TAG: &str = "needs manual review";

/// A random canned question, marked as degraded.
pub fn canned_question() -> String {
    let question = CANNED_QUESTIONS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(CANNED_QUESTIONS[0]);
    format!("{question} {DEGRADED_QUESTION_NOTE}")
}

pub fn fallback_suggestions() -> Vec<String> {
    FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
}

/// The analysis stored when the model could not be used.
///
/// Built from the raw transcript so the article is still useful.
pub fn fallback_analysis(transcript: &str, category: &str) -> AiAnalysisResult {
    let date = chrono::Local::now().format("%Y-%m-%d");
    AiAnalysisResult {
        suggested_title: format!("[Unanalyzed] {category} interview record ({date})"),
        summary: "AI analysis failed, so only the transcript was saved. Please edit this article later."
            .to_string(),
        overview: format!(
            "Detailed analysis was not performed because of an API connection problem or an \
             error during analysis.\n\n{}",
            excerpt(transcript, OVERVIEW_EXCERPT_CHARS)
        ),
        key_insights: vec![
            "Automatic AI analysis did not run for this interview.".to_string(),
            "Review the transcript and summarize the key points manually.".to_string(),
        ],
        planning_notes: vec!["Add planning notes after reviewing the transcript.".to_string()],
        execution_notes: vec!["Add execution notes after reviewing the transcript.".to_string()],
        tags: vec![category.to_string(), NEEDS_REVIEW_TAG.to_string()],
    }
}

/// The analysis for a conversation too short to analyze.
pub fn insufficient_content_analysis(transcript: &str, category: &str) -> AiAnalysisResult {
    AiAnalysisResult {
        suggested_title: format!("{category} interview (too short to analyze)"),
        summary: "The interview ended before enough answers were recorded for analysis.".to_string(),
        overview: format!(
            "Fewer than {MIN_RESPONDENT_TURNS_FOR_ANALYSIS} answers were recorded, so no analysis \
             was attempted.\n\n{}",
            excerpt(transcript, OVERVIEW_EXCERPT_CHARS)
        ),
        key_insights: vec!["Not enough content was recorded to extract insights.".to_string()],
        planning_notes: vec!["Schedule a follow-up interview to cover the topic in depth.".to_string()],
        execution_notes: vec!["No execution notes were recorded.".to_string()],
        tags: vec![category.to_string(), NEEDS_REVIEW_TAG.to_string()],
    }
}
