//! Terminal UI helpers

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};

use lectern_core::{Answer, Result, FALLBACK_NOTICE};

const PROMPT: &str = "lectern>";
const VERSION_LINE: &str = concat!("v", env!("CARGO_PKG_VERSION"), " • Powered by Gemini");

/// Lines of the startup banner for a given terminal width, uncoloured
pub fn banner_lines(terminal_width: usize) -> Vec<String> {
    let width = terminal_width.saturating_sub(4).clamp(56, 64);
    let inner = width - 2;

    let boxed = |text: &str| {
        let pad = inner.saturating_sub(text.chars().count() + 2);
        format!("│  {}{}│", text, " ".repeat(pad))
    };

    let mut lines = vec![format!("┌{}┐", "─".repeat(inner)), boxed("")];
    for text in [
        "Lectern - Lecture Notes Assistant",
        "",
        "Ask follow-up questions about the transcript.",
        "Answers come from the transcript when it can;",
        "otherwise the general model answers, with a notice.",
        "",
        VERSION_LINE,
    ] {
        lines.push(boxed(text));
    }
    lines.push(boxed(""));
    lines.push(format!("└{}┘", "─".repeat(inner)));
    lines
}

/// Display the startup banner
pub fn display_banner() {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);

    println!();
    for line in banner_lines(terminal_width) {
        println!("{}", line.blue());
    }
    println!();
    println!(
        "{}",
        "Tip: type a question about the lecture, or 'help' for commands".dimmed()
    );
    println!();
}

/// Read one line, with ↑/↓ history when attached to a terminal
///
/// Returns `None` at end of input or when Ctrl-C/Ctrl-D is pressed.
pub async fn handle_input_with_history(history: &mut Vec<String>) -> Result<Option<String>> {
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(Some(input));
    }

    enable_raw_mode()?;
    let result = read_raw_line(history);
    disable_raw_mode()?;
    println!();

    let line = result?;
    if let Some(input) = &line {
        if !input.is_empty() {
            history.push(input.clone());
        }
    }
    Ok(line)
}

fn redraw(input: &str, previous_len: usize) -> io::Result<()> {
    let clear = " ".repeat(previous_len.saturating_sub(input.chars().count()));
    print!("\r{} {}{}\r{} {}", PROMPT.green().bold(), input, clear, PROMPT.green().bold(), input);
    io::stdout().flush()
}

fn read_raw_line(history: &[String]) -> Result<Option<String>> {
    let mut input = String::new();
    let mut history_index: Option<usize> = None;

    print!("{} ", PROMPT.green().bold());
    io::stdout().flush()?;

    loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        if key_event.kind != KeyEventKind::Press {
            continue;
        }

        let previous_len = input.chars().count();
        match key_event.code {
            KeyCode::Enter => return Ok(Some(input)),
            KeyCode::Char('c') | KeyCode::Char('d')
                if key_event.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                return Ok(None);
            }
            KeyCode::Char(c) => {
                input.push(c);
                redraw(&input, previous_len)?;
            }
            KeyCode::Backspace => {
                if input.pop().is_some() {
                    redraw(&input, previous_len)?;
                }
            }
            KeyCode::Up if !history.is_empty() => {
                let index = match history_index {
                    None => history.len() - 1,
                    Some(i) => i.saturating_sub(1),
                };
                history_index = Some(index);
                input = history[index].clone();
                redraw(&input, previous_len)?;
            }
            KeyCode::Down => {
                if let Some(i) = history_index {
                    if i + 1 < history.len() {
                        history_index = Some(i + 1);
                        input = history[i + 1].clone();
                    } else {
                        history_index = None;
                        input.clear();
                    }
                    redraw(&input, previous_len)?;
                }
            }
            KeyCode::Esc => return Ok(Some(String::new())),
            _ => {}
        }
    }
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - Ask about the lecture transcript", "<question>".green());
    println!("  {} - Show index statistics for this session", "stats".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - End the session and remove its index", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  What is the main idea of the lecture?");
    println!("  Summarize the part about photosynthesis");
}

/// Print an answer; fallback answers get the notice highlighted
pub fn display_answer(answer: &Answer) {
    match answer {
        Answer::Grounded(text) => {
            println!("{}", text);
        }
        Answer::Fallback(text) => {
            println!();
            println!("{}", FALLBACK_NOTICE.yellow());
            println!();
            println!("{}", text);
        }
    }
    println!();
}

pub fn display_error(message: &str) {
    eprintln!("{} {}", "Error:".red().bold(), message);
}
