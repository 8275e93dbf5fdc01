use crate::clipboard::{Clipboard, ClipboardManager, CopyOutcome};
use crate::config::{Settings, SettingsStore};
use crate::process::{
    secret_invocation, update_invocation, Action, Invocation, OutputView, ProcessError,
    ProcessEvent, ProcessRunner,
};
use crate::store::{StoreEntry, StoreTree};
use crate::ui::dialog::SettingsDialog;
use crate::ui::theme::Theme;
use anyhow::Result;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// How long transient status messages stay in the footer.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

pub const MSG_COPIED: &str = "Password copied to clipboard";
pub const MSG_CLEARED: &str = "Clipboard cleared";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Tree,
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub expires_at: Instant,
}

pub struct App {
    pub settings: SettingsStore,
    pub tree: StoreTree,
    pub selected_index: usize,
    pub output: OutputView,
    /// Lines scrolled down from the top of the output.
    pub output_scroll: usize,
    pub focus: FocusPane,
    pub should_quit: bool,
    pub dialog: Option<SettingsDialog>,
    pub theme: Theme,
    runner: ProcessRunner,
    clipboard: ClipboardManager,
    pending_action: Option<Action>,
    busy: bool,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(settings: SettingsStore, clipboard: Box<dyn Clipboard>, theme: Theme) -> Result<Self> {
        let tree = StoreTree::load(settings.settings().pass_store.as_str())?;
        Ok(Self {
            settings,
            tree,
            selected_index: 0,
            output: OutputView::new(),
            output_scroll: 0,
            focus: FocusPane::Tree,
            should_quit: false,
            dialog: None,
            theme,
            runner: ProcessRunner::new(),
            clipboard: ClipboardManager::new(clipboard),
            pending_action: None,
            busy: false,
            status: None,
        })
    }

    // ---------------------------------------------------------------------
    // Processes
    // ---------------------------------------------------------------------

    /// Whether the action controls accept input. They are disabled while a
    /// process runs.
    pub fn controls_enabled(&self) -> bool {
        !self.busy
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn pending_action(&self) -> Option<Action> {
        self.pending_action
    }

    /// Run `git pull` for the store.
    pub fn update_store(&mut self) {
        let invocation = update_invocation(self.settings.settings());
        self.launch(invocation);
    }

    /// Launch an invocation unless one is already running.
    pub fn launch(&mut self, invocation: Invocation) {
        if self.busy {
            return;
        }

        self.output.clear();
        self.output_scroll = 0;
        self.pending_action = Some(invocation.action);
        self.busy = true;

        let working_dir = PathBuf::from(&self.settings.settings().pass_store);
        info!("running {:?} action with {}", invocation.action, invocation.program);
        if let Err(e) = self
            .runner
            .start(&invocation.program, &invocation.args, &working_dir)
        {
            self.handle_process_event(ProcessEvent::Error(e), Instant::now());
        }
    }

    /// Deliver everything that happened since the last tick: process events,
    /// due clipboard clears, expired status messages.
    pub fn tick(&mut self, now: Instant) {
        for event in self.runner.poll_events() {
            self.handle_process_event(event, now);
        }

        match self.clipboard.poll(now) {
            Ok(true) => self.set_status(MSG_CLEARED, now),
            Ok(false) => {}
            Err(e) => {
                warn!("failed to clear clipboard: {:#}", e);
                self.set_status(&format!("Failed to clear clipboard: {}", e), now);
            }
        }

        if self.status.as_ref().is_some_and(|s| s.expires_at <= now) {
            self.status = None;
        }
    }

    pub fn handle_process_event(&mut self, event: ProcessEvent, now: Instant) {
        match event {
            ProcessEvent::ReadyRead => self.ready_read(),
            ProcessEvent::Error(error) => {
                warn!("process error: {:?}", error);
                self.output.show_error(error);
                if error == ProcessError::FailedToStart {
                    // No exit will follow a launch failure.
                    self.busy = false;
                    self.pending_action = None;
                }
            }
            ProcessEvent::Finished { .. } => {
                let failed = event.is_failure();
                if failed {
                    self.output.mark_failed();
                }
                self.drain_output();
                self.busy = false;
                let elapsed = self.runner.started_at().map(|t| now.saturating_duration_since(t));
                info!("process finished: {:?} after {:?}", event, elapsed);

                match self.pending_action.take() {
                    Some(Action::Secret) if !failed => self.copy_secret(now),
                    Some(Action::Git) => self.refresh_tree(),
                    _ => {}
                }
            }
        }
    }

    /// Append whatever is buffered: stderr if there is any, stdout otherwise.
    fn ready_read(&mut self) {
        let error = self.runner.read_all_standard_error();
        if error.is_empty() {
            let out = self.runner.read_all_standard_output();
            self.output.append_stdout(&out);
        } else {
            self.output.append_stderr(&error);
        }
    }

    /// Append everything still buffered once the process has exited.
    fn drain_output(&mut self) {
        let error = self.runner.read_all_standard_error();
        if !error.is_empty() {
            self.output.append_stderr(&error);
        }
        let out = self.runner.read_all_standard_output();
        if !out.is_empty() {
            self.output.append_stdout(&out);
        }
    }

    fn copy_secret(&mut self, now: Instant) {
        let settings = self.settings.settings();
        if !settings.use_clipboard {
            return;
        }
        let autoclear = settings
            .use_autoclear
            .then(|| Duration::from_secs(u64::from(settings.autoclear_seconds)));

        match self
            .clipboard
            .copy_first_line(self.output.text(), autoclear, now)
        {
            Ok(CopyOutcome::Copied { .. }) => self.set_status(MSG_COPIED, now),
            Ok(CopyOutcome::NothingToCopy) => {}
            Err(e) => {
                warn!("failed to copy to clipboard: {:#}", e);
                self.set_status(&format!("Failed to copy to clipboard: {}", e), now);
            }
        }
    }

    pub fn pending_clipboard_clears(&self) -> usize {
        self.clipboard.pending_clears()
    }

    // ---------------------------------------------------------------------
    // Status line
    // ---------------------------------------------------------------------

    pub fn set_status(&mut self, text: &str, now: Instant) {
        self.status = Some(StatusMessage {
            text: text.to_string(),
            expires_at: now + STATUS_TIMEOUT,
        });
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    // ---------------------------------------------------------------------
    // Tree navigation
    // ---------------------------------------------------------------------

    pub fn visible_entries(&self) -> Vec<&StoreEntry> {
        self.tree.visible()
    }

    pub fn selected_entry(&self) -> Option<StoreEntry> {
        self.tree.visible().get(self.selected_index).map(|e| (*e).clone())
    }

    pub fn next(&mut self) {
        let count = self.tree.visible().len();
        if count > 0 {
            self.selected_index = (self.selected_index + 1) % count;
        }
    }

    pub fn previous(&mut self) {
        let count = self.tree.visible().len();
        if count > 0 {
            if self.selected_index > 0 {
                self.selected_index -= 1;
            } else {
                self.selected_index = count - 1;
            }
        }
    }

    /// Activate the selected node: directories expand or collapse, files are
    /// decrypted.
    pub fn activate_selected(&mut self) {
        let Some(entry) = self.selected_entry() else {
            return;
        };
        if entry.is_dir {
            self.tree.toggle(&entry.path);
        } else if self.controls_enabled() {
            let invocation = secret_invocation(self.settings.settings(), &entry.path);
            self.launch(invocation);
        }
    }

    /// Collapse the selected directory, or move to the parent directory.
    pub fn handle_left(&mut self) {
        let Some(entry) = self.selected_entry() else {
            return;
        };
        if entry.is_dir && self.tree.is_expanded(&entry.path) {
            self.tree.collapse(&entry.path);
            return;
        }
        let Some(parent) = entry.path.parent() else {
            return;
        };
        if let Some(index) = self
            .tree
            .visible()
            .iter()
            .position(|e| e.is_dir && e.path == parent)
        {
            self.selected_index = index;
        }
    }

    /// Expand the selected directory.
    pub fn handle_right(&mut self) {
        if let Some(entry) = self.selected_entry() {
            if entry.is_dir {
                self.tree.expand(&entry.path);
            }
        }
    }

    fn refresh_tree(&mut self) {
        if let Err(e) = self.tree.refresh() {
            warn!("failed to refresh store tree: {:#}", e);
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let count = self.tree.visible().len();
        if self.selected_index >= count {
            self.selected_index = count.saturating_sub(1);
        }
    }

    // ---------------------------------------------------------------------
    // Output pane
    // ---------------------------------------------------------------------

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FocusPane::Tree if !self.output.is_empty() => FocusPane::Output,
            _ => FocusPane::Tree,
        };
    }

    pub fn scroll_output_down(&mut self) {
        if self.output_scroll < self.output.line_count().saturating_sub(1) {
            self.output_scroll += 1;
        }
    }

    pub fn scroll_output_up(&mut self) {
        self.output_scroll = self.output_scroll.saturating_sub(1);
    }

    pub fn scroll_output_to_top(&mut self) {
        self.output_scroll = 0;
    }

    pub fn scroll_output_to_bottom(&mut self) {
        self.output_scroll = self.output.line_count().saturating_sub(1);
    }

    // ---------------------------------------------------------------------
    // Settings
    // ---------------------------------------------------------------------

    pub fn open_settings(&mut self) {
        if self.controls_enabled() {
            self.dialog = Some(SettingsDialog::new(self.settings.settings()));
        }
    }

    pub fn close_settings(&mut self) {
        self.dialog = None;
    }

    /// Persist accepted settings and re-root the tree at the store path.
    pub fn apply_settings(&mut self, settings: Settings, now: Instant) {
        self.dialog = None;
        if let Err(e) = self.settings.replace(settings) {
            warn!("failed to save settings: {:#}", e);
            self.set_status(&format!("Failed to save settings: {}", e), now);
        }

        let store = self.settings.settings().pass_store.clone();
        if let Err(e) = self.tree.set_root(store.as_str()) {
            warn!("failed to load store {}: {:#}", store, e);
        }
        self.selected_index = 0;
    }
}
