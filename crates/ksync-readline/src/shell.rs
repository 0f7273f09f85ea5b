//! Command handling for the interactive shell.

use crate::command::{Command, HELP};
use crate::helper::CliHelper;
use anyhow::{Result, anyhow};
use colored::Colorize;
use ksync_application::{
    ArticleExporter, FinalizeStep, InterviewOrchestrator, InterviewState, KnowledgeBase, KsyncApp,
    PendingCall,
};
use ksync_core::article::KnowledgeArticle;
use ksync_core::session::{InterviewSession, Message, MessageRole, SessionMode, SessionSetup};
use rustyline::Editor;
use rustyline::history::DefaultHistory;
use tokio::sync::watch;

pub type LineEditor = Editor<CliHelper, DefaultHistory>;

pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    app: KsyncApp,
    knowledge: KnowledgeBase,
    exporter: ArticleExporter,
    interview: Option<InterviewOrchestrator>,
    /// Text placed in the next input line (a picked suggestion).
    prefill: Option<String>,
}

impl Shell {
    pub fn new(app: KsyncApp) -> Result<Self> {
        Ok(Self {
            knowledge: app.knowledge_base(),
            exporter: app.exporter()?,
            app,
            interview: None,
            prefill: None,
        })
    }

    pub fn banner(&self) {
        println!("{}", "=== ksync: tacit knowledge interviews ===".bright_magenta().bold());
        let status = self.app.ai_status();
        if status.available {
            println!("{}", status.message.bright_black());
        } else {
            println!("{}", status.message.yellow());
        }
        println!(
            "{}",
            "Type /new to start an interview, /articles to browse, /help for all commands."
                .bright_black()
        );
        println!();
    }

    pub fn prompt(&self) -> String {
        match self.chatting() {
            Some(session) => match session.mode {
                SessionMode::AiInterviewer => "answer> ".to_string(),
                SessionMode::ManualRecording => "question> ".to_string(),
            },
            None => "ksync> ".to_string(),
        }
    }

    pub fn take_prefill(&mut self) -> Option<String> {
        self.prefill.take()
    }

    pub async fn handle(&mut self, command: Command, rl: &mut LineEditor) -> Result<Flow> {
        match command {
            Command::New => self.new_interview(rl).await?,
            Command::Input(text) => self.input(&text).await?,
            Command::Reply(text) => self.reply(&text).await?,
            Command::Use(n) => {
                let text = self.active()?.use_suggestion(n - 1)?;
                self.prefill = Some(text);
            }
            Command::End | Command::Retry => self.finalize().await?,
            Command::Draft => {
                self.active()?.exit_as_draft().await?;
                println!("{}", "Saved as draft. Use /resume to continue later.".green());
            }
            Command::Articles(query) => self.list_articles(&query).await?,
            Command::Export { article_id, format } => {
                let article = self.knowledge.get_article(&article_id).await?;
                let path = self
                    .exporter
                    .write_export(&article, format, &self.app.paths().exports_dir())
                    .await?;
                println!("{} {}", "Exported to".green(), path.display());
            }
            Command::Stats => self.stats().await?,
            Command::Resume(None) => self.list_resumable().await?,
            Command::Resume(Some(id)) => self.resume(&id).await?,
            Command::Status => {
                self.status();
                return Ok(Flow::Continue);
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => {
                if self.chatting().is_some() {
                    println!(
                        "{}",
                        "The interview so far is saved; /resume picks it up next time."
                            .bright_black()
                    );
                }
                println!("{}", "Goodbye!".bright_green());
                return Ok(Flow::Quit);
            }
        }
        self.warn_unsaved();
        Ok(Flow::Continue)
    }

    /// Reminds the user while the newest messages are only in memory.
    fn warn_unsaved(&self) {
        let Some(orchestrator) = &self.interview else {
            return;
        };
        if let Some(error) = orchestrator.state().unsaved() {
            println!(
                "{}",
                format!("Not saved yet: {error}. The interview is kept in memory; keep going or /draft once space is free.")
                    .yellow()
            );
        }
    }

    async fn new_interview(&mut self, rl: &mut LineEditor) -> Result<()> {
        if self.chatting().is_some() {
            return Err(anyhow!(
                "an interview is in progress; finish it with /end or leave with /draft"
            ));
        }

        let title = rl.readline("Title: ")?;
        let interviewee = rl.readline("Interviewee: ")?;
        let category = rl.readline("Category (e.g. Engineering, Sales): ")?;
        let mode = match rl
            .readline("Mode [1] AI interviewer  [2] manual recording (default 1): ")?
            .trim()
        {
            "" | "1" | "ai" => SessionMode::AiInterviewer,
            "2" | "manual" => SessionMode::ManualRecording,
            other => return Err(anyhow!("unknown mode '{other}'")),
        };

        let mut orchestrator = self.app.orchestrator();
        watch_progress(orchestrator.subscribe());
        let session = orchestrator
            .start(SessionSetup::new(title, interviewee, category, mode))
            .await?;
        println!();
        print_messages(session.messages());
        match mode {
            SessionMode::AiInterviewer => println!(
                "{}",
                "Type your answers. /end when finished, /draft to stop for now.".bright_black()
            ),
            SessionMode::ManualRecording => println!(
                "{}",
                "Type each question you ask, then /reply <answer> with the response.".bright_black()
            ),
        }
        self.interview = Some(orchestrator);
        Ok(())
    }

    async fn resume(&mut self, session_id: &str) -> Result<()> {
        if self.chatting().is_some() {
            return Err(anyhow!(
                "an interview is in progress; finish it with /end or leave with /draft"
            ));
        }

        let mut orchestrator = self.app.orchestrator();
        watch_progress(orchestrator.subscribe());
        let session = orchestrator.resume(session_id).await?;
        println!(
            "{}",
            format!("Resuming \"{}\" with {}", session.title, session.interviewee).green()
        );
        print_messages(session.messages());
        self.interview = Some(orchestrator);
        Ok(())
    }

    async fn input(&mut self, text: &str) -> Result<()> {
        let orchestrator = self.active()?;
        let mode = orchestrator
            .session()
            .map(|s| s.mode)
            .ok_or_else(|| anyhow!("no interview in progress; use /new or /resume"))?;

        match mode {
            SessionMode::AiInterviewer => {
                let reply = orchestrator.submit_answer(text).await?;
                if reply.is_degraded() {
                    println!("{}", "(AI unavailable, using a prepared question)".yellow());
                }
                print_message(&Message::interviewer(reply.value));
            }
            SessionMode::ManualRecording => orchestrator.record_question(text).await?,
        }
        Ok(())
    }

    async fn reply(&mut self, text: &str) -> Result<()> {
        let reply = self.active()?.record_answer(text).await?;
        println!("{}", "Suggested follow-ups (/use <n>):".bright_black());
        for (i, suggestion) in reply.value.iter().enumerate() {
            println!("  {} {}", format!("[{}]", i + 1).yellow(), suggestion);
        }
        Ok(())
    }

    async fn finalize(&mut self) -> Result<()> {
        let orchestrator = self.active()?;
        match orchestrator.finalize().await {
            Ok(article) => {
                print_article_summary(&article);
                Ok(())
            }
            Err(e) => {
                if let InterviewState::Chat {
                    failure: Some(failure),
                    ..
                } = orchestrator.state()
                {
                    if failure.retryable {
                        println!(
                            "{}",
                            "Your conversation is safe. Free up space, then /retry.".yellow()
                        );
                    }
                }
                Err(e.into())
            }
        }
    }

    async fn list_articles(&self, query: &str) -> Result<()> {
        let articles = self.knowledge.search_articles(query).await?;
        if articles.is_empty() {
            println!("{}", "No articles found.".bright_black());
            return Ok(());
        }
        for article in &articles {
            println!(
                "{}  {}  {}  {}",
                article.id.bright_black(),
                article.created_at.format("%Y-%m-%d"),
                article.title.bold(),
                article.tags.join(", ").cyan()
            );
        }
        Ok(())
    }

    async fn list_resumable(&self) -> Result<()> {
        let sessions = self.knowledge.resumable_sessions().await?;
        if sessions.is_empty() {
            println!("{}", "No drafts to resume.".bright_black());
            return Ok(());
        }
        for session in &sessions {
            println!(
                "{}  {}  {} ({} messages, {})",
                session.id.bright_black(),
                session.updated_at.format("%Y-%m-%d %H:%M"),
                session.title.bold(),
                session.messages().len(),
                session.status()
            );
        }
        Ok(())
    }

    async fn stats(&self) -> Result<()> {
        let stats = self.knowledge.dashboard_stats().await?;
        println!("Interviews:           {}", stats.total_sessions);
        println!("Completed interviews: {}", stats.completed_sessions);
        println!("Knowledge articles:   {}", stats.total_articles);
        if !stats.top_tags.is_empty() {
            let tags: Vec<String> = stats
                .top_tags
                .iter()
                .map(|t| format!("{} ({})", t.tag, t.count))
                .collect();
            println!("Top tags:             {}", tags.join(", "));
        }
        Ok(())
    }

    fn status(&self) {
        let ai = self.app.ai_status();
        println!("AI:        {}", ai.message);
        println!("Data dir:  {}", self.app.paths().data_dir().display());
        match &self.interview {
            Some(orchestrator) => {
                let state = orchestrator.state();
                println!("Interview: {}", state.name());
                if let Some(session) = orchestrator.session() {
                    println!(
                        "           \"{}\" with {} ({}, {} messages)",
                        session.title,
                        session.interviewee,
                        session.status(),
                        session.messages().len()
                    );
                }
                if let InterviewState::Chat {
                    failure: Some(failure),
                    ..
                } = &state
                {
                    println!("Last error: {}", failure.message.red());
                }
                if let Some(error) = state.unsaved() {
                    println!("Unsaved:    {}", error.yellow());
                }
            }
            None => println!("Interview: none"),
        }
    }

    fn active(&mut self) -> Result<&mut InterviewOrchestrator> {
        self.interview
            .as_mut()
            .ok_or_else(|| anyhow!("no interview in progress; use /new or /resume"))
    }

    /// The session while the interview is in chat.
    fn chatting(&self) -> Option<&InterviewSession> {
        let orchestrator = self.interview.as_ref()?;
        match orchestrator.state() {
            InterviewState::Chat { .. } => orchestrator.session(),
            _ => None,
        }
    }
}

/// Prints the typing indicator and finalization steps as the state changes.
///
/// The task ends when the orchestrator is dropped.
fn watch_progress(mut rx: watch::Receiver<InterviewState>) {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            match state {
                InterviewState::Chat {
                    pending: PendingCall::NextQuestion,
                    ..
                } => println!("{}", "Interviewer is typing...".bright_black()),
                InterviewState::Chat {
                    pending: PendingCall::Suggestions,
                    ..
                } => println!("{}", "Thinking of follow-up questions...".bright_black()),
                InterviewState::Finalizing { step } => {
                    let marker = if step == FinalizeStep::Saving { "*" } else { "-" };
                    println!("  {} {}", marker.bright_magenta(), step.label().bright_black());
                }
                _ => {}
            }
        }
    });
}

fn print_messages(messages: &[Message]) {
    for message in messages {
        print_message(message);
    }
}

fn print_message(message: &Message) {
    let label = format!("[{}]", message.role.speaker_label());
    match message.role {
        MessageRole::Interviewer => {
            println!("{}", label.bright_magenta());
            for line in message.content.lines() {
                println!("{}", line.bright_blue());
            }
        }
        MessageRole::Respondent => {
            println!("{}", label.green());
            println!("{}", message.content);
        }
        MessageRole::System | MessageRole::AiSuggestion => {
            println!("{}", format!("{label} {}", message.content).bright_black());
        }
    }
    println!();
}

fn print_article_summary(article: &KnowledgeArticle) {
    println!();
    println!("{}", "Knowledge article created".bright_green().bold());
    println!("{}", article.title.bold());
    println!("{}", article.summary);
    for (i, insight) in article.key_insights.iter().enumerate() {
        println!("  {}. {}", i + 1, insight);
    }
    if !article.tags.is_empty() {
        println!("{}", article.tags.join(", ").cyan());
    }
    println!(
        "{}",
        format!("Export with /export {} [html|md|txt]", article.id).bright_black()
    );
}
