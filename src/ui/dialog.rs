//! # Settings Dialog
//!
//! A modal form for editing every persisted setting. It works on a draft copy
//! of [`Settings`]; nothing changes until the form is accepted.
//!
//! ## Keys
//!
//! - `↑` / `↓` / `Tab` / `Shift+Tab` - move between fields
//! - typing / `Backspace` - edit the focused text field
//! - `Space` - flip the focused toggle
//! - `Enter` - accept
//! - `Esc` - cancel

use crate::config::Settings;
use crossterm::event::{KeyCode, KeyEvent};

/// Longest accepted autoclear value, in digits.
const MAX_SECONDS_DIGITS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    PassExecutable,
    GitExecutable,
    GpgExecutable,
    PassStore,
    UsePass,
    UseClipboard,
    UseAutoclear,
    AutoclearSeconds,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::PassExecutable,
        Field::GitExecutable,
        Field::GpgExecutable,
        Field::PassStore,
        Field::UsePass,
        Field::UseClipboard,
        Field::UseAutoclear,
        Field::AutoclearSeconds,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::PassExecutable => "pass",
            Field::GitExecutable => "git",
            Field::GpgExecutable => "gpg",
            Field::PassStore => "Store path",
            Field::UsePass => "Use pass",
            Field::UseClipboard => "Copy to clipboard",
            Field::UseAutoclear => "Autoclear clipboard",
            Field::AutoclearSeconds => "Autoclear seconds",
        }
    }

    pub fn is_toggle(self) -> bool {
        matches!(
            self,
            Field::UsePass | Field::UseClipboard | Field::UseAutoclear
        )
    }
}

/// Result of feeding a key to the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    Continue,
    Accepted(Settings),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct SettingsDialog {
    draft: Settings,
    /// Edited separately so partial input like "" survives until accept.
    seconds: String,
    focused: usize,
}

impl SettingsDialog {
    pub fn new(settings: &Settings) -> Self {
        Self {
            draft: settings.clone(),
            seconds: settings.autoclear_seconds.to_string(),
            focused: 0,
        }
    }

    pub fn focused(&self) -> Field {
        Field::ALL[self.focused]
    }

    /// Display value of a field.
    pub fn value(&self, field: Field) -> String {
        let flag = |on: bool| if on { "[x]" } else { "[ ]" }.to_string();
        match field {
            Field::PassExecutable => self.draft.pass_executable.clone(),
            Field::GitExecutable => self.draft.git_executable.clone(),
            Field::GpgExecutable => self.draft.gpg_executable.clone(),
            Field::PassStore => self.draft.pass_store.clone(),
            Field::UsePass => flag(self.draft.use_pass),
            Field::UseClipboard => flag(self.draft.use_clipboard),
            Field::UseAutoclear => flag(self.draft.use_autoclear),
            Field::AutoclearSeconds => self.seconds.clone(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> DialogOutcome {
        match key.code {
            KeyCode::Esc => return DialogOutcome::Cancelled,
            KeyCode::Enter => return DialogOutcome::Accepted(self.finish()),
            KeyCode::Down | KeyCode::Tab => self.focus_next(),
            KeyCode::Up | KeyCode::BackTab => self.focus_previous(),
            KeyCode::Char(' ') if self.focused().is_toggle() => self.toggle(),
            KeyCode::Char(c) => self.push_char(c),
            KeyCode::Backspace => self.pop_char(),
            _ => {}
        }
        DialogOutcome::Continue
    }

    fn focus_next(&mut self) {
        self.focused = (self.focused + 1) % Field::ALL.len();
    }

    fn focus_previous(&mut self) {
        self.focused = self
            .focused
            .checked_sub(1)
            .unwrap_or(Field::ALL.len() - 1);
    }

    fn toggle(&mut self) {
        match self.focused() {
            Field::UsePass => self.draft.use_pass = !self.draft.use_pass,
            Field::UseClipboard => self.draft.use_clipboard = !self.draft.use_clipboard,
            Field::UseAutoclear => self.draft.use_autoclear = !self.draft.use_autoclear,
            _ => {}
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.focused() {
            Field::PassExecutable => Some(&mut self.draft.pass_executable),
            Field::GitExecutable => Some(&mut self.draft.git_executable),
            Field::GpgExecutable => Some(&mut self.draft.gpg_executable),
            Field::PassStore => Some(&mut self.draft.pass_store),
            Field::AutoclearSeconds => Some(&mut self.seconds),
            _ => None,
        }
    }

    fn push_char(&mut self, c: char) {
        if self.focused() == Field::AutoclearSeconds
            && (!c.is_ascii_digit() || self.seconds.len() >= MAX_SECONDS_DIGITS)
        {
            return;
        }
        if let Some(text) = self.text_mut() {
            text.push(c);
        }
    }

    fn pop_char(&mut self) {
        if let Some(text) = self.text_mut() {
            text.pop();
        }
    }

    fn finish(&self) -> Settings {
        let mut settings = self.draft.clone();
        settings.autoclear_seconds = self.seconds.parse().unwrap_or(0);
        settings
    }
}
