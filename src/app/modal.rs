use std::collections::VecDeque;

use crate::domain::{Action, Record};

/// What the controller hands to the selection UI.
#[derive(Debug, Clone)]
pub struct SelectionRequest<'a> {
    pub action: Action,
    pub message: String,
    pub records: Vec<&'a Record>,
    /// One short label per record, built from the screen's key fields.
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionResult {
    Selected(usize),
    Cancelled,
}

/// The UI surface the engine talks to: a record picker, a yes/no
/// confirmation and an informational message box.
pub trait SelectionModal {
    fn choose(&mut self, request: &SelectionRequest<'_>) -> SelectionResult;

    fn confirm(&mut self, message: &str) -> bool;

    fn inform(&mut self, message: &str);
}

/// Headless modal that answers from queued responses and records what it
/// was shown. Unanswered prompts cancel.
#[derive(Debug, Default)]
pub struct ScriptedModal {
    choices: VecDeque<SelectionResult>,
    confirmations: VecDeque<bool>,
    pub prompts: Vec<String>,
    pub confirm_prompts: Vec<String>,
    pub messages: Vec<String>,
}

impl ScriptedModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn choosing(mut self, index: usize) -> Self {
        self.choices.push_back(SelectionResult::Selected(index));
        self
    }

    pub fn cancelling(mut self) -> Self {
        self.choices.push_back(SelectionResult::Cancelled);
        self
    }

    pub fn confirming(mut self, answer: bool) -> Self {
        self.confirmations.push_back(answer);
        self
    }

    pub fn was_opened(&self) -> bool {
        !self.prompts.is_empty()
    }
}

impl SelectionModal for ScriptedModal {
    fn choose(&mut self, request: &SelectionRequest<'_>) -> SelectionResult {
        self.prompts.push(request.message.clone());
        self.choices
            .pop_front()
            .unwrap_or(SelectionResult::Cancelled)
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.confirm_prompts.push(message.to_string());
        self.confirmations.pop_front().unwrap_or(false)
    }

    fn inform(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
