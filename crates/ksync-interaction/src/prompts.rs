//! Prompt templates and response schemas for the three gateway operations.
//!
//! Each prompt is a typed context rendered through a Jinja template.

use crate::agent::AgentError;
use minijinja::Environment;
use serde::Serialize;
use serde_json::{Value, json};

const NEXT_QUESTION_TEMPLATE: &str = r#"Context: You are a professional interviewer drawing out tacit knowledge (rules of thumb, tricks of the trade, decision criteria) from {{ interviewee }} about "{{ topic }}".

Conversation so far:
{{ transcript }}

Stage: {{ stage_guidance }}

Instructions:
1. Building on the respondent's last answer, write exactly one concrete follow-up question.
2. Avoid abstract questions. Ask things like "Concretely, what did you look at?", "Why did you decide that?" or "Has this ever gone wrong?" to surface knowledge from the field.
3. Be polite and natural.

Output: only the text of the question. No JSON, no quotation marks."#;

const SUGGESTIONS_TEMPLATE: &str = r#"Context: You assist an experienced interviewer who is drawing out an employee's tacit knowledge about "{{ topic }}".

Conversation so far:
{{ transcript }}

Task: Based on the last answer, suggest {{ count }} short follow-up questions that dig into hidden details, the reasons behind decisions, or practical tricks.
Format: return only a JSON array of {{ count }} strings.
Example: ["What numbers did you look at when you decided?", "What would you have done with a smaller budget?", "How did you share this with the team?"]"#;

const ANALYSIS_TEMPLATE: &str = r#"Analyze the following interview about "{{ category }}" and turn it into a knowledge article the organization can reuse.

Interview transcript:
{{ transcript }}

Goal:
Extract the tacit knowledge in the work: best practices, lessons from failures, and decision criteria.
Keep "things to watch for while planning" separate from "things to watch for while executing".

Output format (JSON), exactly this structure and no Markdown code fences:
{
  "suggestedTitle": "A specific, professional title that captures the content",
  "summary": "A short summary of the key points for list views (under 150 characters).",
  "overview": "Detailed overview, background and context of the article.",
  "keyInsights": ["Key point 1", "Tip for success 2", "Decision criterion 3"],
  "planningNotes": ["What to watch for while planning or preparing", "What to confirm beforehand"],
  "executionNotes": ["What to watch for while executing", "Troubleshooting"],
  "tags": ["Category tag 1", "Tag 2"]
}"#;

fn render<S: Serialize>(template: &str, ctx: S) -> Result<String, AgentError> {
    Environment::new()
        .render_str(template, ctx)
        .map_err(|e| AgentError::Prompt(e.to_string()))
}

#[derive(Debug, Clone, Serialize)]
pub struct NextQuestionPrompt<'a> {
    pub topic: &'a str,
    pub interviewee: &'a str,
    pub transcript: &'a str,
    pub stage_guidance: &'a str,
}

impl NextQuestionPrompt<'_> {
    pub fn render(&self) -> Result<String, AgentError> {
        render(NEXT_QUESTION_TEMPLATE, self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestionsPrompt<'a> {
    pub topic: &'a str,
    pub transcript: &'a str,
    pub count: usize,
}

impl SuggestionsPrompt<'_> {
    pub fn render(&self) -> Result<String, AgentError> {
        render(SUGGESTIONS_TEMPLATE, self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisPrompt<'a> {
    pub category: &'a str,
    pub transcript: &'a str,
}

impl AnalysisPrompt<'_> {
    pub fn render(&self) -> Result<String, AgentError> {
        render(ANALYSIS_TEMPLATE, self)
    }
}

/// Response schema for the suggestion list.
pub fn suggestions_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": { "type": "STRING" }
    })
}

/// Response schema for the session analysis.
pub fn analysis_schema() -> Value {
    let string_list = json!({ "type": "ARRAY", "items": { "type": "STRING" } });
    json!({
        "type": "OBJECT",
        "properties": {
            "suggestedTitle": { "type": "STRING" },
            "summary": { "type": "STRING" },
            "overview": { "type": "STRING" },
            "keyInsights": string_list,
            "planningNotes": string_list,
            "executionNotes": string_list,
            "tags": string_list
        },
        "required": [
            "suggestedTitle", "summary", "overview",
            "keyInsights", "planningNotes", "executionNotes", "tags"
        ]
    })
}
