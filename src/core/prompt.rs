use dialoguer::{theme::ColorfulTheme, Confirm, Input};

use crate::error::NasError;

/// Source of operator answers
pub trait Prompter {
    /// Ask a yes/no question
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool, NasError>;

    /// Ask for free text; `None` when the operator gives no answer
    fn input(&mut self, question: &str) -> Result<Option<String>, NasError>;
}

/// Interactive prompts on the terminal
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool, NasError> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(question)
            .default(default)
            .interact()?)
    }

    fn input(&mut self, question: &str) -> Result<Option<String>, NasError> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(question)
            .allow_empty(true)
            .interact_text()?;
        let answer = answer.trim();
        Ok((!answer.is_empty()).then(|| answer.to_string()))
    }
}

/// Batch mode: every confirmation is a yes, nothing ever blocks
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&mut self, _question: &str, _default: bool) -> Result<bool, NasError> {
        Ok(true)
    }

    fn input(&mut self, _question: &str) -> Result<Option<String>, NasError> {
        Ok(None)
    }
}
