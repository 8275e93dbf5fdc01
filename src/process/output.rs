//! The output view model: the text shown in the output pane and its colour.
//!
//! Colour is a property of the whole text, not of individual chunks. As soon
//! as any stderr arrives, or the process fails, everything accumulated so far
//! is shown in the error colour.

use super::runner::ProcessError;

/// Colour of the whole output text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputTone {
    #[default]
    Normal,
    Error,
}

#[derive(Debug, Clone, Default)]
pub struct OutputView {
    text: String,
    tone: OutputTone,
}

impl OutputView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty the view and reset its colour, ready for a new process.
    pub fn clear(&mut self) {
        self.text.clear();
        self.tone = OutputTone::Normal;
    }

    pub fn append_stdout(&mut self, chunk: &str) {
        self.text.push_str(chunk);
    }

    /// Append a stderr chunk, turning the entire text red.
    pub fn append_stderr(&mut self, chunk: &str) {
        self.tone = OutputTone::Error;
        self.text.push_str(chunk);
    }

    /// Mark the current text as the output of a failed run.
    pub fn mark_failed(&mut self) {
        self.tone = OutputTone::Error;
    }

    /// Replace the text with the message for a process error.
    pub fn show_error(&mut self, error: ProcessError) {
        self.tone = OutputTone::Error;
        self.text = error.to_string();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tone(&self) -> OutputTone {
        self.tone
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    pub fn line_count(&self) -> usize {
        self.text.lines().count()
    }
}
