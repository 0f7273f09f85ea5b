//! The AI gateway: the three interview operations over a [`TextGenerator`].
//!
//! Every public operation is total. Missing credentials, transport errors,
//! and unusable model output all end in fallback content, tagged through
//! [`GatewayReply::origin`] so callers can tell it apart from model output.

use crate::agent::{AgentError, GenerationRequest, TextGenerator};
use crate::fallback::{
    FALLBACK_SUGGESTIONS, MIN_RESPONDENT_TURNS_FOR_ANALYSIS, UNCONFIGURED_QUESTION,
    canned_question, fallback_analysis, fallback_suggestions, insufficient_content_analysis,
};
use crate::gemini_api_agent::GeminiApiAgent;
use crate::prompts::{
    AnalysisPrompt, NextQuestionPrompt, SuggestionsPrompt, analysis_schema, suggestions_schema,
};
use crate::reply::{GatewayReply, ReplyOrigin};
use crate::retry::{RetryPolicy, attempt_with_fallback};
use crate::transcript::{InterviewStage, excerpt, format_transcript, strip_code_fences};
use ksync_core::analysis::AiAnalysisResult;
use ksync_core::article::dedup_tags;
use ksync_core::config::AiConfig;
use ksync_core::session::{Message, respondent_turns};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Number of follow-up suggestions offered in manual recording mode.
pub const SUGGESTION_COUNT: usize = 3;

const SUMMARY_FROM_OVERVIEW_CHARS: usize = 150;

/// Generation settings for the gateway operations.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayOptions {
    pub question_temperature: f32,
    pub analysis_temperature: f32,
    pub question_max_output_tokens: u32,
    pub analysis_max_output_tokens: u32,
    pub retry: RetryPolicy,
}

impl From<&AiConfig> for GatewayOptions {
    fn from(config: &AiConfig) -> Self {
        Self {
            question_temperature: config.question_temperature,
            analysis_temperature: config.analysis_temperature,
            question_max_output_tokens: config.question_max_output_tokens,
            analysis_max_output_tokens: config.analysis_max_output_tokens,
            retry: RetryPolicy::from(&config.retry),
        }
    }
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self::from(&AiConfig::default())
    }
}

/// Whether AI features are live, with a message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AiStatus {
    pub available: bool,
    pub message: String,
}

#[derive(Clone)]
pub struct AiGateway {
    generator: Option<Arc<dyn TextGenerator>>,
    options: GatewayOptions,
}

impl AiGateway {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, options: GatewayOptions) -> Self {
        Self { generator, options }
    }

    /// A gateway with no model behind it; every reply is fallback content.
    pub fn unconfigured(options: GatewayOptions) -> Self {
        Self::new(None, options)
    }

    /// Builds a Gemini-backed gateway, or an unconfigured one without a key.
    pub fn from_config(api_key: Option<&str>, config: &AiConfig) -> Self {
        let options = GatewayOptions::from(config);
        let Some(api_key) = api_key.map(str::trim).filter(|k| !k.is_empty()) else {
            tracing::info!("No Gemini API key configured; AI features use fallback content");
            return Self::unconfigured(options);
        };

        match GeminiApiAgent::from_config(api_key, config) {
            Ok(agent) => Self::new(Some(Arc::new(agent)), options),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to create Gemini agent; AI features disabled");
                Self::unconfigured(options)
            }
        }
    }

    pub fn is_ai_available(&self) -> bool {
        self.generator.is_some()
    }

    pub fn ai_status(&self) -> AiStatus {
        match &self.generator {
            Some(generator) => AiStatus {
                available: true,
                message: format!("AI features are available (model: {}).", generator.name()),
            },
            None => AiStatus {
                available: false,
                message: "No Gemini API key is configured. Questions, suggestions and analysis \
                          use fallback content. Set GEMINI_API_KEY or add the key to secret.json."
                    .to_string(),
            },
        }
    }

    /// Produces the interviewer's next question.
    ///
    /// The reply is never empty.
    pub async fn generate_next_question(
        &self,
        history: &[Message],
        topic: &str,
        interviewee: &str,
    ) -> GatewayReply<String> {
        let Some(generator) = self.generator.as_deref() else {
            return GatewayReply::unconfigured(UNCONFIGURED_QUESTION.to_string());
        };

        let transcript = format_transcript(history);
        let stage = InterviewStage::of(history);
        let prompt = NextQuestionPrompt {
            topic,
            interviewee,
            transcript: &transcript,
            stage_guidance: stage.guidance(),
        }
        .render();
        let request = match prompt {
            Ok(prompt) => GenerationRequest::text(prompt)
                .with_temperature(self.options.question_temperature)
                .with_max_output_tokens(self.options.question_max_output_tokens),
            Err(e) => return GatewayReply::fallback(canned_question(), e.to_string()),
        };

        let request = &request;
        attempt_with_fallback(
            &self.options.retry,
            "next_question",
            move |_| async move {
                let text = generator.generate(request).await?;
                clean_question(&text).ok_or(AgentError::EmptyResponse)
            },
            |_| canned_question(),
        )
        .await
    }

    /// Offers exactly [`SUGGESTION_COUNT`] follow-up questions for a human interviewer.
    pub async fn generate_follow_up_suggestions(
        &self,
        history: &[Message],
        topic: &str,
    ) -> GatewayReply<Vec<String>> {
        let Some(generator) = self.generator.as_deref() else {
            return GatewayReply::unconfigured(fallback_suggestions());
        };

        let transcript = format_transcript(history);
        let prompt = SuggestionsPrompt {
            topic,
            transcript: &transcript,
            count: SUGGESTION_COUNT,
        }
        .render();
        let request = match prompt {
            Ok(prompt) => GenerationRequest::json(prompt, suggestions_schema())
                .with_temperature(self.options.question_temperature)
                .with_max_output_tokens(self.options.question_max_output_tokens),
            Err(e) => return GatewayReply::fallback(fallback_suggestions(), e.to_string()),
        };

        let request = &request;
        attempt_with_fallback(
            &self.options.retry,
            "follow_up_suggestions",
            move |_| async move {
                let text = generator.generate(request).await?;
                parse_suggestions(&text)
            },
            |_| fallback_suggestions(),
        )
        .await
    }

    /// Turns a finished transcript into structured knowledge.
    ///
    /// Every field of the result is populated whatever happens.
    pub async fn analyze_session(
        &self,
        messages: &[Message],
        category: &str,
    ) -> GatewayReply<AiAnalysisResult> {
        let transcript = format_transcript(messages);

        if respondent_turns(messages) < MIN_RESPONDENT_TURNS_FOR_ANALYSIS {
            tracing::info!(category, "Transcript too short, skipping analysis");
            return GatewayReply::fallback(
                insufficient_content_analysis(&transcript, category),
                format!("fewer than {MIN_RESPONDENT_TURNS_FOR_ANALYSIS} respondent turns"),
            );
        }

        let Some(generator) = self.generator.as_deref() else {
            tracing::warn!("API key missing, using fallback analysis");
            return GatewayReply {
                value: fallback_analysis(&transcript, category),
                origin: ReplyOrigin::Unconfigured,
            };
        };

        let prompt = AnalysisPrompt {
            category,
            transcript: &transcript,
        }
        .render();
        let request = match prompt {
            Ok(prompt) => GenerationRequest::json(prompt, analysis_schema())
                .with_temperature(self.options.analysis_temperature)
                .with_max_output_tokens(self.options.analysis_max_output_tokens),
            Err(e) => {
                return GatewayReply::fallback(fallback_analysis(&transcript, category), e.to_string());
            }
        };

        let request = &request;
        let transcript = transcript.as_str();
        attempt_with_fallback(
            &self.options.retry,
            "analyze_session",
            move |_| async move {
                let text = generator.generate(request).await?;
                parse_analysis(&text, category, transcript)
            },
            |_| fallback_analysis(transcript, category),
        )
        .await
    }
}

fn clean_question(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim();
    (!unquoted.is_empty()).then(|| unquoted.to_string())
}

/// Parses the suggestion array, truncating or padding it to three entries.
fn parse_suggestions(text: &str) -> Result<Vec<String>, AgentError> {
    let raw: Vec<Value> = serde_json::from_str(strip_code_fences(text))
        .map_err(|e| AgentError::MalformedOutput(format!("suggestions are not a JSON array: {e}")))?;

    let mut suggestions: Vec<String> = raw
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if suggestions.is_empty() {
        return Err(AgentError::MalformedOutput(
            "no usable suggestions in the reply".to_string(),
        ));
    }

    suggestions.truncate(SUGGESTION_COUNT);
    for filler in FALLBACK_SUGGESTIONS {
        if suggestions.len() >= SUGGESTION_COUNT {
            break;
        }
        if !suggestions.iter().any(|s| s == filler) {
            suggestions.push(filler.to_string());
        }
    }
    Ok(suggestions)
}

/// Model output before validation. Any field may be missing or mistyped.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawAnalysis {
    suggested_title: Option<Value>,
    summary: Option<Value>,
    overview: Option<Value>,
    key_insights: Option<Value>,
    planning_notes: Option<Value>,
    execution_notes: Option<Value>,
    tags: Option<Value>,
}

fn text_field(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn list_field(value: Option<Value>) -> Vec<String> {
    let items = match value {
        Some(Value::Array(items)) => items,
        Some(Value::String(s)) => vec![Value::String(s)],
        _ => Vec::new(),
    };
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn or_default(list: Vec<String>, default: &str) -> Vec<String> {
    if list.is_empty() {
        vec![default.to_string()]
    } else {
        list
    }
}

impl RawAnalysis {
    fn into_result(self, category: &str, transcript: &str) -> AiAnalysisResult {
        let title = text_field(self.suggested_title);
        let summary = text_field(self.summary);
        let overview = text_field(self.overview);

        let overview = match (overview.is_empty(), summary.is_empty()) {
            (false, _) => overview,
            (true, false) => summary.clone(),
            (true, true) => excerpt(transcript, crate::fallback::OVERVIEW_EXCERPT_CHARS),
        };
        let summary = if summary.is_empty() {
            excerpt(&overview, SUMMARY_FROM_OVERVIEW_CHARS)
        } else {
            summary
        };

        let mut tags = dedup_tags(list_field(self.tags));
        if tags.is_empty() {
            tags.push(category.to_string());
        }

        AiAnalysisResult {
            suggested_title: if title.is_empty() {
                format!("{category} interview notes")
            } else {
                title
            },
            summary,
            overview,
            key_insights: or_default(
                list_field(self.key_insights),
                "No key insights were extracted. Review the transcript.",
            ),
            planning_notes: or_default(
                list_field(self.planning_notes),
                "No planning notes were extracted.",
            ),
            execution_notes: or_default(
                list_field(self.execution_notes),
                "No execution notes were extracted.",
            ),
            tags,
        }
    }
}

fn parse_analysis(
    text: &str,
    category: &str,
    transcript: &str,
) -> Result<AiAnalysisResult, AgentError> {
    let value: Value = serde_json::from_str(strip_code_fences(text))
        .map_err(|e| AgentError::MalformedOutput(format!("analysis is not valid JSON: {e}")))?;
    if !value.is_object() {
        return Err(AgentError::MalformedOutput(
            "analysis is not a JSON object".to_string(),
        ));
    }
    let raw: RawAnalysis = serde_json::from_value(value)
        .map_err(|e| AgentError::MalformedOutput(e.to_string()))?;
    Ok(raw.into_result(category, transcript))
}
