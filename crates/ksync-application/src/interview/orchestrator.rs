//! Drives one interview from setup to a saved knowledge article.

use super::state::{FinalizeFailure, FinalizeStep, InterviewState, PendingCall};
use ksync_core::article::{ArticleRepository, KnowledgeArticle};
use ksync_core::config::InterviewConfig;
use ksync_core::session::{
    InterviewSession, Message, SessionMode, SessionRepository, SessionSetup, SessionStatus,
};
use ksync_core::{KsyncError, Result};
use ksync_interaction::{AiGateway, GatewayReply};
use std::sync::Arc;
use tokio::sync::watch;

/// System notice seeded into manual recordings.
pub const RECORDING_STARTED: &str = "Recording started.";

/// The AI interviewer's opening line.
pub fn greeting(interviewee: &str, category: &str) -> String {
    format!(
        "Hello {interviewee}, thank you for your time. Today I'd like to hear about \"{category}\". \
         To begin, what do you pay the most attention to in this area of your work?"
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArticleWrite {
    Insert,
    Update,
    Done,
}

/// An article from a finalization attempt that did not complete.
///
/// Kept so a retry neither repeats the analysis for an unchanged
/// transcript nor stores the article twice.
#[derive(Debug)]
struct PendingArticle {
    article: KnowledgeArticle,
    write: ArticleWrite,
    /// Transcript length the article was built from.
    message_count: usize,
}

/// Runs a single interview session.
///
/// Owns the active session, so only one AI call can be outstanding at a
/// time. State changes are published on a watch channel (see
/// [`InterviewOrchestrator::subscribe`]) for the front-end's typing
/// indicator and progress display.
pub struct InterviewOrchestrator {
    gateway: AiGateway,
    sessions: Arc<dyn SessionRepository>,
    articles: Arc<dyn ArticleRepository>,
    config: InterviewConfig,
    state: watch::Sender<InterviewState>,
    session: Option<InterviewSession>,
    suggestions: Vec<String>,
    pending_article: Option<PendingArticle>,
    /// Error from the latest failed session save, cleared by the next success.
    unsaved: Option<String>,
}

impl InterviewOrchestrator {
    pub fn new(
        gateway: AiGateway,
        sessions: Arc<dyn SessionRepository>,
        articles: Arc<dyn ArticleRepository>,
        config: InterviewConfig,
    ) -> Self {
        let (state, _) = watch::channel(InterviewState::Setup);
        Self {
            gateway,
            sessions,
            articles,
            config,
            state,
            session: None,
            suggestions: Vec::new(),
            pending_article: None,
            unsaved: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<InterviewState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> InterviewState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> Option<&InterviewSession> {
        self.session.as_ref()
    }

    /// Follow-up suggestions for the current manual recording turn.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn gateway(&self) -> &AiGateway {
        &self.gateway
    }

    /// Creates a session from `setup`, seeds its opening message and enters chat.
    pub async fn start(&mut self, setup: SessionSetup) -> Result<&InterviewSession> {
        self.require_idle("start an interview")?;

        let mut session = InterviewSession::from_setup(&setup)?;
        session.start()?;
        let opening = match session.mode {
            SessionMode::AiInterviewer => {
                Message::interviewer(greeting(&session.interviewee, &session.category))
            }
            SessionMode::ManualRecording => Message::system(RECORDING_STARTED),
        };
        session.append_message(opening)?;
        tracing::info!(session_id = %session.id, mode = %session.mode, "Interview started");

        self.session = Some(session);
        self.suggestions.clear();
        self.pending_article = None;
        self.unsaved = None;
        self.persist().await;
        self.set_state(self.chat_state(PendingCall::None, None));
        self.session_ref()
    }

    /// Reopens a stored `Draft` or `InProgress` session.
    pub async fn resume(&mut self, session_id: &str) -> Result<&InterviewSession> {
        self.require_idle("resume an interview")?;

        let mut session = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| KsyncError::not_found("Session", session_id))?;
        if !session.is_resumable() {
            return Err(KsyncError::invalid_state(format!(
                "session {} is '{}' and cannot be resumed",
                session.id,
                session.status()
            )));
        }
        session.start()?;
        tracing::info!(
            session_id = %session.id,
            messages = session.messages().len(),
            "Interview resumed"
        );

        self.session = Some(session);
        self.suggestions.clear();
        self.pending_article = None;
        self.unsaved = None;
        self.persist().await;
        self.set_state(self.chat_state(PendingCall::None, None));
        self.session_ref()
    }

    /// AI interviewer mode: records the respondent's answer and asks the next question.
    pub async fn submit_answer(&mut self, text: &str) -> Result<GatewayReply<String>> {
        self.require_input("send an answer")?;
        self.require_mode(SessionMode::AiInterviewer, "send an answer")?;

        self.append(Message::respondent(text.trim())).await?;
        self.set_state(self.chat_state(PendingCall::NextQuestion, None));

        let session = self.session_ref()?;
        let reply = self
            .gateway
            .generate_next_question(session.messages(), &session.category, &session.interviewee)
            .await;
        if reply.is_degraded() {
            tracing::warn!(origin = ?reply.origin, "Using fallback interviewer question");
        }

        let appended = self.append(Message::interviewer(reply.value.clone())).await;
        self.set_state(self.chat_state(PendingCall::None, None));
        appended?;
        Ok(reply)
    }

    /// Manual recording mode: records a question the human interviewer asked.
    pub async fn record_question(&mut self, text: &str) -> Result<()> {
        self.require_input("record a question")?;
        self.require_mode(SessionMode::ManualRecording, "record a question")?;

        self.append(Message::interviewer(text.trim())).await?;
        self.set_state(self.chat_state(PendingCall::None, None));
        Ok(())
    }

    /// Manual recording mode: records an answer and refreshes the suggestions.
    pub async fn record_answer(&mut self, text: &str) -> Result<GatewayReply<Vec<String>>> {
        self.require_input("record an answer")?;
        self.require_mode(SessionMode::ManualRecording, "record an answer")?;

        self.append(Message::respondent(text.trim())).await?;
        self.set_state(self.chat_state(PendingCall::Suggestions, None));

        let session = self.session_ref()?;
        let reply = self
            .gateway
            .generate_follow_up_suggestions(session.messages(), &session.category)
            .await;

        self.suggestions = reply.value.clone();
        self.set_state(self.chat_state(PendingCall::None, None));
        Ok(reply)
    }

    /// Returns suggestion `index` (0-based) as text for the question input.
    ///
    /// Nothing is sent; the caller decides whether to record it.
    pub fn use_suggestion(&self, index: usize) -> Result<String> {
        self.require_input("use a suggestion")?;
        self.suggestions.get(index).cloned().ok_or_else(|| {
            KsyncError::validation(format!(
                "no suggestion {}; {} available",
                index + 1,
                self.suggestions.len()
            ))
        })
    }

    /// Turns the transcript into a stored article and completes the session.
    ///
    /// On failure the orchestrator returns to chat with the failure
    /// recorded in its state. The transcript is never discarded and calling
    /// `finalize` again resumes where the last attempt stopped.
    pub async fn finalize(&mut self) -> Result<KnowledgeArticle> {
        self.require_input("finish the interview")?;

        let turns = self.session_ref()?.respondent_turns();
        let needed = self.config.min_respondent_turns;
        if turns < needed {
            return Err(KsyncError::validation(format!(
                "at least {needed} answer(s) are needed before finishing; {turns} recorded"
            )));
        }

        match self.run_finalization().await {
            Ok(article) => {
                tracing::info!(article_id = %article.id, title = %article.title, "Interview finalized");
                self.pending_article = None;
                self.suggestions.clear();
                self.unsaved = None;
                self.set_state(InterviewState::Completed {
                    article_id: article.id.clone(),
                });
                Ok(article)
            }
            Err(err) => {
                tracing::error!(error = %err, "Finalization failed; interview kept for retry");
                let failure = FinalizeFailure {
                    message: err.to_string(),
                    retryable: err.is_retryable(),
                };
                self.set_state(self.chat_state(PendingCall::None, Some(failure)));
                Err(err)
            }
        }
    }

    /// Leaves the interview, keeping the session as `Draft`.
    pub async fn exit_as_draft(&mut self) -> Result<()> {
        self.require_input("save as draft")?;

        let mut draft = self.session_ref()?.clone();
        draft.mark_draft()?;
        self.sessions.save(&draft).await?;
        tracing::info!(
            session_id = %draft.id,
            messages = draft.messages().len(),
            "Interview saved as draft"
        );

        self.session = Some(draft);
        self.suggestions.clear();
        self.unsaved = None;
        self.set_state(InterviewState::Exited {
            status: SessionStatus::Draft,
        });
        Ok(())
    }

    async fn run_finalization(&mut self) -> Result<KnowledgeArticle> {
        let message_count = self.session_ref()?.messages().len();

        let mut pending = match self.pending_article.take() {
            Some(previous) if previous.message_count == message_count => previous,
            previous => {
                let mut article = self.build_article().await?;
                let write = match previous {
                    Some(p) if p.write != ArticleWrite::Insert => {
                        // Already stored from an older transcript; replace it in place.
                        article.id = p.article.id;
                        ArticleWrite::Update
                    }
                    _ => ArticleWrite::Insert,
                };
                PendingArticle {
                    article,
                    write,
                    message_count,
                }
            }
        };

        self.set_state(InterviewState::Finalizing {
            step: FinalizeStep::Saving,
        });
        self.pace().await;

        match self.commit(&mut pending).await {
            Ok(completed) => {
                self.session = Some(completed);
                Ok(pending.article)
            }
            Err(err) => {
                self.pending_article = Some(pending);
                Err(err)
            }
        }
    }

    async fn build_article(&self) -> Result<KnowledgeArticle> {
        let session = self.session_ref()?;

        self.set_state(InterviewState::Finalizing {
            step: FinalizeStep::Analyzing,
        });
        self.pace().await;
        let analysis = self
            .gateway
            .analyze_session(session.messages(), &session.category)
            .await;
        if analysis.is_degraded() {
            tracing::warn!(origin = ?analysis.origin, "Article built from fallback analysis");
        }

        self.set_state(InterviewState::Finalizing {
            step: FinalizeStep::ExtractingHighlights,
        });
        self.pace().await;
        self.set_state(InterviewState::Finalizing {
            step: FinalizeStep::GeneratingArticle,
        });
        self.pace().await;

        let analysis = analysis.into_value();
        if analysis.is_complete() {
            Ok(KnowledgeArticle::from_analysis(analysis, session))
        } else {
            tracing::error!(session_id = %session.id, "Analysis incomplete, storing error article");
            Ok(KnowledgeArticle::analysis_failed(session))
        }
    }

    /// Stores the article, then the completed session.
    ///
    /// The in-memory session only changes once both writes succeeded.
    async fn commit(&self, pending: &mut PendingArticle) -> Result<InterviewSession> {
        match pending.write {
            ArticleWrite::Insert => self.articles.save(&pending.article).await?,
            ArticleWrite::Update => self.articles.update(&pending.article).await?,
            ArticleWrite::Done => {}
        }
        pending.write = ArticleWrite::Done;

        let mut completed = self.session_ref()?.clone();
        completed.complete()?;
        self.sessions.save(&completed).await?;
        Ok(completed)
    }

    async fn append(&mut self, message: Message) -> Result<()> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| KsyncError::internal("no active session"))?;
        session.append_message(message)?;

        self.suggestions.clear();
        if self
            .pending_article
            .as_ref()
            .is_some_and(|p| p.write == ArticleWrite::Insert)
        {
            self.pending_article = None;
        }
        self.persist().await;
        Ok(())
    }

    /// Saves the active session.
    ///
    /// A failure does not abort the turn: the message stays in memory, the
    /// error is published as `unsaved` in the chat state, and the next save
    /// writes the whole transcript again.
    async fn persist(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        match self.sessions.save(session).await {
            Ok(()) => {
                if self.unsaved.take().is_some() {
                    tracing::info!(session_id = %session.id, "Session saved after earlier failure");
                }
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %session.id,
                    error = %e,
                    "Failed to save session; will retry on next change"
                );
                self.unsaved = Some(e.to_string());
            }
        }
    }

    fn chat_state(&self, pending: PendingCall, failure: Option<FinalizeFailure>) -> InterviewState {
        InterviewState::Chat {
            pending,
            failure,
            unsaved: self.unsaved.clone(),
        }
    }

    async fn pace(&self) {
        let delay = self.config.finalize_step_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn set_state(&self, state: InterviewState) {
        tracing::debug!(state = state.name(), "Interview state changed");
        self.state.send_replace(state);
    }

    fn session_ref(&self) -> Result<&InterviewSession> {
        self.session
            .as_ref()
            .ok_or_else(|| KsyncError::internal("no active session"))
    }

    fn require_idle(&self, action: &str) -> Result<()> {
        let state = self.state.borrow();
        if state.is_idle() {
            Ok(())
        } else {
            Err(KsyncError::invalid_state(format!(
                "cannot {action} while the interview is in {}",
                state.name()
            )))
        }
    }

    fn require_input(&self, action: &str) -> Result<()> {
        let state = self.state.borrow();
        if state.accepts_input() {
            Ok(())
        } else {
            Err(KsyncError::invalid_state(format!(
                "cannot {action} while the interview is in {}",
                state.name()
            )))
        }
    }

    fn require_mode(&self, mode: SessionMode, action: &str) -> Result<()> {
        let session = self.session_ref()?;
        if session.mode == mode {
            Ok(())
        } else {
            Err(KsyncError::invalid_state(format!(
                "cannot {action} in {} mode",
                session.mode
            )))
        }
    }
}
