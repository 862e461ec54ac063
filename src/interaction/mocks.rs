use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use super::prompts::{is_affirmative, matches_phrase, Prompter};
use crate::error::{ErrorCode, Result, SyncError};

/// Prompter that replays canned answers in order and records every question
#[derive(Clone, Default)]
pub struct ScriptedPrompter {
    answers: Arc<Mutex<VecDeque<String>>>,
    asked: Arc<Mutex<Vec<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Arc::new(Mutex::new(answers.into_iter().map(Into::into).collect())),
            asked: Arc::default(),
        }
    }

    /// Questions asked so far, in order
    pub fn asked(&self) -> Vec<String> {
        lock(&self.asked).clone()
    }

    fn next_answer(&self, message: &str) -> Result<String> {
        lock(&self.asked).push(message.to_string());
        lock(&self.answers).pop_front().ok_or_else(|| {
            SyncError::execution_with_code(
                ErrorCode::EXEC_PROMPT_FAILED,
                format!("No scripted answer for prompt: {}", message),
                None,
            )
        })
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn confirm(&self, message: &str) -> Result<bool> {
        Ok(is_affirmative(&self.next_answer(message)?))
    }

    async fn confirm_phrase(&self, message: &str, phrase: &str) -> Result<bool> {
        Ok(matches_phrase(&self.next_answer(message)?, phrase))
    }
}
