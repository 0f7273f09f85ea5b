//! REPL command parsing.

use ksync_application::ExportFormat;

/// Slash commands offered for completion and hints.
pub const COMMANDS: [&str; 14] = [
    "/new", "/reply", "/use", "/end", "/retry", "/draft", "/articles", "/export", "/stats",
    "/resume", "/status", "/help", "/quit", "/exit",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New,
    /// Respondent transcription in manual recording mode.
    Reply(String),
    /// 1-based suggestion number.
    Use(usize),
    End,
    Retry,
    Draft,
    Articles(String),
    Export { article_id: String, format: ExportFormat },
    Stats,
    /// Without an id, lists resumable sessions.
    Resume(Option<String>),
    Status,
    Help,
    Quit,
    /// A plain line: an answer in AI mode, a question in manual mode.
    Input(String),
}

impl Command {
    /// Parses one trimmed, non-empty line.
    pub fn parse(line: &str) -> Result<Self, String> {
        if !line.starts_with('/') {
            return Ok(Self::Input(line.to_string()));
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        match name {
            "/new" => Ok(Self::New),
            "/reply" => {
                if rest.is_empty() {
                    Err("usage: /reply <what the respondent said>".to_string())
                } else {
                    Ok(Self::Reply(rest.to_string()))
                }
            }
            "/use" => rest
                .parse::<usize>()
                .ok()
                .filter(|n| *n >= 1)
                .map(Self::Use)
                .ok_or_else(|| "usage: /use <suggestion number>".to_string()),
            "/end" => Ok(Self::End),
            "/retry" => Ok(Self::Retry),
            "/draft" => Ok(Self::Draft),
            "/articles" => Ok(Self::Articles(rest.to_string())),
            "/export" => {
                let mut args = rest.split_whitespace();
                let article_id = args
                    .next()
                    .ok_or_else(|| "usage: /export <article id> [html|md|txt]".to_string())?;
                let format = match args.next() {
                    Some(f) => f.parse::<ExportFormat>().map_err(|e| e.to_string())?,
                    None => ExportFormat::Html,
                };
                Ok(Self::Export {
                    article_id: article_id.to_string(),
                    format,
                })
            }
            "/stats" => Ok(Self::Stats),
            "/resume" => Ok(Self::Resume((!rest.is_empty()).then(|| rest.to_string()))),
            "/status" => Ok(Self::Status),
            "/help" => Ok(Self::Help),
            "/quit" | "/exit" => Ok(Self::Quit),
            other => Err(format!("unknown command {other}; type /help")),
        }
    }
}

pub const HELP: &str = "\
Interview
  /new                    set up a new interview
  <text>                  answer (AI mode) or record a question (manual mode)
  /reply <text>           record the respondent's answer (manual mode)
  /use <n>                put suggestion n into the input line
  /end                    finish and generate the knowledge article
  /retry                  retry a failed finish
  /draft                  leave and keep the interview as a draft
  /resume [id]            list or reopen draft interviews
Knowledge base
  /articles [query]       list or search articles
  /export <id> [html|md|txt]
  /stats                  dashboard numbers
Other
  /status  /help  /quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_is_input() {
        assert_eq!(
            Command::parse("We rehearse first.").unwrap(),
            Command::Input("We rehearse first.".to_string())
        );
    }

    #[test]
    fn test_arguments() {
        assert_eq!(
            Command::parse("/reply  Find a champion.").unwrap(),
            Command::Reply("Find a champion.".to_string())
        );
        assert_eq!(Command::parse("/use 2").unwrap(), Command::Use(2));
        assert_eq!(
            Command::parse("/articles database").unwrap(),
            Command::Articles("database".to_string())
        );
        assert_eq!(Command::parse("/resume").unwrap(), Command::Resume(None));
        assert_eq!(
            Command::parse("/export kb-101 md").unwrap(),
            Command::Export {
                article_id: "kb-101".to_string(),
                format: ExportFormat::Markdown
            }
        );
        assert_eq!(
            Command::parse("/export kb-101").unwrap(),
            Command::Export {
                article_id: "kb-101".to_string(),
                format: ExportFormat::Html
            }
        );
    }

    #[test]
    fn test_rejects_bad_usage() {
        assert!(Command::parse("/reply").is_err());
        assert!(Command::parse("/use 0").is_err());
        assert!(Command::parse("/use two").is_err());
        assert!(Command::parse("/export").is_err());
        assert!(Command::parse("/export kb-101 pdf").is_err());
        assert!(Command::parse("/plan").is_err());
    }
}
