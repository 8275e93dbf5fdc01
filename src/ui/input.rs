//! Keyboard handling.
//!
//! ### Store tree (left pane)
//! - `q` / `Q` - quit
//! - `j` / `Down`, `k` / `Up` - move selection
//! - `h` / `Left` - collapse directory or jump to its parent
//! - `l` / `Right` - expand directory
//! - `Enter` - expand/collapse directory, or decrypt the selected entry
//! - `u` - pull the store from its git remote
//! - `c` - open the settings dialog
//! - `Tab` - focus the output pane
//!
//! ### Output pane
//! - `j` / `k` - scroll
//! - `g` / `G` - jump to top / bottom
//! - `Tab` / `Esc` / `q` - back to the tree
//!
//! While a process runs, `Enter` on an entry, `u` and `c` are ignored.

use crate::ui::app::{App, FocusPane};
use crate::ui::dialog::DialogOutcome;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Instant;

pub fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    if key.kind == KeyEventKind::Release {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if let Some(dialog) = app.dialog.as_mut() {
        match dialog.handle_key(key) {
            DialogOutcome::Continue => {}
            DialogOutcome::Cancelled => app.close_settings(),
            DialogOutcome::Accepted(settings) => app.apply_settings(settings, now),
        }
        return;
    }

    match app.focus {
        FocusPane::Output => handle_output_key(app, key),
        FocusPane::Tree => handle_tree_key(app, key),
    }
}

fn handle_tree_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => app.should_quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.next(),
        KeyCode::Up | KeyCode::Char('k') => app.previous(),
        KeyCode::Left | KeyCode::Char('h') => app.handle_left(),
        KeyCode::Right | KeyCode::Char('l') => app.handle_right(),
        KeyCode::Enter => app.activate_selected(),
        KeyCode::Char('u') if app.controls_enabled() => app.update_store(),
        KeyCode::Char('c') => app.open_settings(),
        KeyCode::Tab => app.toggle_focus(),
        _ => {}
    }
}

fn handle_output_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc | KeyCode::Tab => app.focus = FocusPane::Tree,
        KeyCode::Down | KeyCode::Char('j') => app.scroll_output_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_output_up(),
        KeyCode::Char('g') => app.scroll_output_to_top(),
        KeyCode::Char('G') => app.scroll_output_to_bottom(),
        _ => {}
    }
}
