//! Interactive question loop over one transcript session

use colored::*;
use tracing::warn;

use lectern_core::{AnswerClassifier, Embedder, Error, LLMProvider, Result, Retriever};
use lectern_rag::{NotesPipeline, TranscriptSession};

use crate::ui::{display_answer, display_error, handle_input_with_history, print_help};

/// What one line of input asks the loop to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Ask(String),
    Stats,
    Help,
    Exit,
    Empty,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "" => ReplCommand::Empty,
            "exit" | "quit" | ":q" => ReplCommand::Exit,
            "help" | "?" => ReplCommand::Help,
            "stats" => ReplCommand::Stats,
            _ => ReplCommand::Ask(trimmed.to_string()),
        }
    }
}

/// Answer questions until the user leaves, then close the session
///
/// Provider failures are reported and the loop continues; the session is
/// closed on every exit path.
pub async fn run_chat_loop<L, E, C>(
    pipeline: &NotesPipeline<L, E, C>,
    session: &TranscriptSession<E>,
) -> Result<()>
where
    L: LLMProvider,
    E: Embedder + 'static,
    C: AnswerClassifier,
{
    let result = chat_until_exit(pipeline, session).await;

    if let Err(e) = session.close().await {
        warn!(error = %e, "Failed to close transcript session");
    }

    result
}

async fn chat_until_exit<L, E, C>(
    pipeline: &NotesPipeline<L, E, C>,
    session: &TranscriptSession<E>,
) -> Result<()>
where
    L: LLMProvider,
    E: Embedder + 'static,
    C: AnswerClassifier,
{
    let mut history = Vec::new();

    loop {
        let Some(line) = handle_input_with_history(&mut history).await? else {
            break;
        };

        match ReplCommand::parse(&line) {
            ReplCommand::Empty => continue,
            ReplCommand::Exit => break,
            ReplCommand::Help => print_help(),
            ReplCommand::Stats => {
                let stats = session.stats().await?;
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
            ReplCommand::Ask(question) => {
                println!("{}", "Thinking...".dimmed());
                match pipeline.chat(&question, session).await {
                    Ok(answer) => display_answer(&answer),
                    Err(Error::SessionClosed) => return Err(Error::SessionClosed),
                    Err(e) => display_error(&e.to_string()),
                }
            }
        }
    }

    println!("{}", "Goodbye!".green());
    Ok(())
}
