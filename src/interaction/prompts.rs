use async_trait::async_trait;
use std::io::{self, BufRead, Write};

use crate::error::{ErrorCode, Result, SyncError};

#[async_trait]
pub trait Prompter: Send + Sync {
    /// Ask a yes/no question; anything but an explicit yes declines
    async fn confirm(&self, message: &str) -> Result<bool>;

    /// Ask the operator to type `phrase` exactly
    async fn confirm_phrase(&self, message: &str, phrase: &str) -> Result<bool>;
}

/// Only `y` or `yes` accept, ignoring case and surrounding whitespace
pub fn is_affirmative(input: &str) -> bool {
    let input = input.trim().to_ascii_lowercase();
    input == "y" || input == "yes"
}

/// The typed phrase must match exactly apart from surrounding whitespace
pub fn matches_phrase(input: &str, phrase: &str) -> bool {
    input.trim() == phrase
}

/// Prompts on stderr and reads answers from stdin
pub struct TerminalPrompter;

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }

    fn ask(prompt: &str) -> Result<String> {
        let mut stderr = io::stderr();
        write!(stderr, "{}", prompt)
            .and_then(|_| stderr.flush())
            .map_err(prompt_failed)?;

        // End of input counts as an empty answer, which declines
        let mut input = String::new();
        io::stdin()
            .lock()
            .read_line(&mut input)
            .map_err(prompt_failed)?;
        Ok(input)
    }
}

fn prompt_failed(err: io::Error) -> SyncError {
    SyncError::execution_with_code(
        ErrorCode::EXEC_PROMPT_FAILED,
        "Could not read confirmation from the terminal",
        None,
    )
    .with_source(err)
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn confirm(&self, message: &str) -> Result<bool> {
        let input = Self::ask(&format!("{} [y/N]: ", message))?;
        Ok(is_affirmative(&input))
    }

    async fn confirm_phrase(&self, message: &str, phrase: &str) -> Result<bool> {
        let input = Self::ask(&format!("{}\nType '{}' to continue: ", message, phrase))?;
        Ok(matches_phrase(&input, phrase))
    }
}
