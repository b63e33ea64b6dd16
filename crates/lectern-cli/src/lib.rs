//! Terminal interface for Lectern

mod chat;
mod ui;

#[cfg(test)]
mod tests;

pub use chat::{run_chat_loop, ReplCommand};
pub use ui::{banner_lines, display_answer, display_banner, display_error, handle_input_with_history, print_help};

pub use lectern_core::{Error, Result};
