use std::collections::VecDeque;

use crate::error::{BlueprintError, Result};

/// Synchronous question/answer seam. Every interactive step goes through it.
pub trait Prompter {
    fn text(&mut self, message: &str, default: Option<&str>) -> Result<String>;

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    fn select(&mut self, message: &str, choices: &[String], default: Option<&str>)
        -> Result<String>;

    fn multi_select(&mut self, message: &str, choices: &[String]) -> Result<Vec<String>>;
}

/// Terminal prompts backed by `inquire`.
#[derive(Debug, Default)]
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn text(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        let mut prompt = inquire::Text::new(message);
        if let Some(default) = default {
            prompt = prompt.with_default(default);
        }
        prompt.prompt().map_err(|_| BlueprintError::PromptCancelled)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        inquire::Confirm::new(message)
            .with_default(default)
            .prompt()
            .map_err(|_| BlueprintError::PromptCancelled)
    }

    fn select(
        &mut self,
        message: &str,
        choices: &[String],
        default: Option<&str>,
    ) -> Result<String> {
        let mut prompt = inquire::Select::new(message, choices.to_vec());
        if let Some(idx) = default.and_then(|d| choices.iter().position(|c| c == d)) {
            prompt = prompt.with_starting_cursor(idx);
        }
        prompt.prompt().map_err(|_| BlueprintError::PromptCancelled)
    }

    fn multi_select(&mut self, message: &str, choices: &[String]) -> Result<Vec<String>> {
        inquire::MultiSelect::new(message, choices.to_vec())
            .prompt()
            .map_err(|_| BlueprintError::PromptCancelled)
    }
}

/// Answers every question with its default. Used for `--defaults` runs.
#[derive(Debug, Default)]
pub struct DefaultsPrompter;

impl Prompter for DefaultsPrompter {
    fn text(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        default
            .map(String::from)
            .ok_or_else(|| BlueprintError::PromptUnavailable {
                message: message.to_string(),
            })
    }

    fn confirm(&mut self, _message: &str, default: bool) -> Result<bool> {
        Ok(default)
    }

    fn select(
        &mut self,
        message: &str,
        choices: &[String],
        default: Option<&str>,
    ) -> Result<String> {
        default
            .map(String::from)
            .or_else(|| choices.first().cloned())
            .ok_or_else(|| BlueprintError::PromptUnavailable {
                message: message.to_string(),
            })
    }

    fn multi_select(&mut self, _message: &str, _choices: &[String]) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// A queued answer for [`ScriptedPrompter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Text(String),
    Confirm(bool),
    Select(String),
    Multi(Vec<String>),
    /// Accept whatever default the question offers.
    Default,
}

impl Answer {
    pub fn text(s: &str) -> Self {
        Answer::Text(s.to_string())
    }

    pub fn select(s: &str) -> Self {
        Answer::Select(s.to_string())
    }

    pub fn multi(items: &[&str]) -> Self {
        Answer::Multi(items.iter().map(|s| s.to_string()).collect())
    }
}

/// Replays queued answers in order, recording each question asked.
///
/// Running out of answers, or a queued answer of the wrong kind, is a
/// `PromptUnavailable` error.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, message: &str) -> Result<Answer> {
        self.asked.push(message.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| BlueprintError::PromptUnavailable {
                message: message.to_string(),
            })
    }
}

fn unexpected(message: &str) -> BlueprintError {
    BlueprintError::PromptUnavailable {
        message: message.to_string(),
    }
}

impl Prompter for ScriptedPrompter {
    fn text(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        match self.next(message)? {
            Answer::Text(s) => Ok(s),
            Answer::Default => DefaultsPrompter.text(message, default),
            _ => Err(unexpected(message)),
        }
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        match self.next(message)? {
            Answer::Confirm(b) => Ok(b),
            Answer::Default => Ok(default),
            _ => Err(unexpected(message)),
        }
    }

    fn select(
        &mut self,
        message: &str,
        choices: &[String],
        default: Option<&str>,
    ) -> Result<String> {
        match self.next(message)? {
            Answer::Select(s) if choices.contains(&s) => Ok(s),
            Answer::Default => DefaultsPrompter.select(message, choices, default),
            _ => Err(unexpected(message)),
        }
    }

    fn multi_select(&mut self, message: &str, choices: &[String]) -> Result<Vec<String>> {
        match self.next(message)? {
            Answer::Multi(items) if items.iter().all(|i| choices.contains(i)) => Ok(items),
            Answer::Default => Ok(Vec::new()),
            _ => Err(unexpected(message)),
        }
    }
}
