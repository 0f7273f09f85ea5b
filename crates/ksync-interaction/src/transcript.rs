//! Transcript formatting and reply clean-up shared by all prompts.

use ksync_core::session::{Message, respondent_turns};

pub const EMPTY_TRANSCRIPT: &str = "(no conversation recorded)";

/// Renders the conversation as `Interviewer: …` / `Respondent: …` lines.
///
/// System notices and suggestions are left out.
pub fn format_transcript(messages: &[Message]) -> String {
    let lines: Vec<String> = messages
        .iter()
        .filter(|m| m.role.is_conversational())
        .map(|m| format!("{}: {}", m.role.speaker_label(), m.content))
        .collect();

    if lines.is_empty() {
        EMPTY_TRANSCRIPT.to_string()
    } else {
        lines.join("\n")
    }
}

/// How far along an interview is, judged by respondent turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewStage {
    Early,
    Middle,
    Late,
}

impl InterviewStage {
    pub fn from_respondent_turns(turns: usize) -> Self {
        match turns {
            0..=1 => Self::Early,
            2..=4 => Self::Middle,
            _ => Self::Late,
        }
    }

    pub fn of(messages: &[Message]) -> Self {
        Self::from_respondent_turns(respondent_turns(messages))
    }

    /// Instruction for the interviewer prompt at this stage.
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::Early => {
                "The interview has just started. Establish context first: their role, \
                 the situations where this knowledge matters, and what a typical case looks like."
            }
            Self::Middle => {
                "The interview is under way. Dig into specifics: the judgement calls they make, \
                 the signals they watch for, and mistakes they have learned from."
            }
            Self::Late => {
                "The interview is nearing its end. Consolidate: ask for rules of thumb, advice \
                 they would give a newcomer, or anything important not yet covered."
            }
        }
    }
}

/// Strips a surrounding Markdown code fence (```` ```json ```` or ```` ``` ````).
pub fn strip_code_fences(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// The first `max_chars` characters of `text`, with an ellipsis if cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_transcript_skips_non_conversational() {
        let messages = vec![
            Message::system("Recording started."),
            Message::interviewer("How do you price?"),
            Message::respondent("Cost plus twenty percent."),
        ];

        assert_eq!(
            format_transcript(&messages),
            "Interviewer: How do you price?\nRespondent: Cost plus twenty percent."
        );
        assert_eq!(format_transcript(&[]), EMPTY_TRANSCRIPT);
        assert_eq!(format_transcript(&messages[..1]), EMPTY_TRANSCRIPT);
    }

    #[test]
    fn test_stage_boundaries() {
        assert_eq!(InterviewStage::from_respondent_turns(0), InterviewStage::Early);
        assert_eq!(InterviewStage::from_respondent_turns(1), InterviewStage::Early);
        assert_eq!(InterviewStage::from_respondent_turns(2), InterviewStage::Middle);
        assert_eq!(InterviewStage::from_respondent_turns(4), InterviewStage::Middle);
        assert_eq!(InterviewStage::from_respondent_turns(5), InterviewStage::Late);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[\"a\"]\n```"), "[\"a\"]");
        assert_eq!(strip_code_fences("  ```\n{}\n```  "), "{}");
        assert_eq!(strip_code_fences("[1, 2]"), "[1, 2]");
    }

    #[test]
    fn test_excerpt_counts_characters() {
        assert_eq!(excerpt("短い文章", 10), "短い文章");
        assert_eq!(excerpt("abcdef", 3), "abc...");
    }
}
