mod command;
mod helper;
mod shell;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::command::Command;
use crate::helper::CliHelper;
use crate::shell::{Flow, LineEditor, Shell};
use ksync_application::{AppOptions, KsyncApp};

/// Log filter variable; defaults to `info`.
const LOG_ENV: &str = "KSYNC_LOG";

/// Command-line arguments for the ksync REPL.
#[derive(Parser, Debug)]
#[command(name = "ksync")]
#[command(about = "Interview experts and turn their tacit knowledge into articles")]
#[command(version)]
struct Args {
    /// Directory holding config.toml and secret.json
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Directory holding sessions, articles, exports and logs
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Ignore any API key and use fallback content only
    #[arg(long)]
    offline: bool,
}

/// Logs go to a daily file so they never interleave with the conversation.
fn init_logging(logs_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let file_appender = tracing_appender::rolling::daily(logs_dir, "ksync.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();
    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let options = AppOptions {
        config_dir: args.config_dir,
        data_dir: args.data_dir,
        offline: args.offline,
    };

    let _log_guard = init_logging(&options.resolve_paths()?.logs_dir())?;
    let app = KsyncApp::bootstrap(&options).await?;
    let mut shell = Shell::new(app)?;

    let mut rl: LineEditor = LineEditor::new()?;
    rl.set_helper(Some(CliHelper));
    shell.banner();

    loop {
        let prompt = shell.prompt();
        let readline = match shell.take_prefill() {
            Some(text) => rl.readline_with_initial(&prompt, (text.as_str(), "")),
            None => rl.readline(&prompt),
        };

        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let command = match Command::parse(trimmed) {
                    Ok(command) => command,
                    Err(usage) => {
                        println!("{}", usage.yellow());
                        continue;
                    }
                };

                match shell.handle(command, &mut rl).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => {
                        tracing::debug!(error = %e, "Command failed");
                        eprintln!("{}", format!("Error: {e}").red());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    Ok(())
}
