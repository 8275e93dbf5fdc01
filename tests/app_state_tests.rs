//! Application state tests
//!
//! Drives the app through whole operations against real `sh` processes:
//! decrypting an entry (with stand-in executables), copying it to the
//! clipboard, clearing it again, and pulling the store.

use passdeck::clipboard::MemoryClipboard;
use passdeck::config::{Settings, SettingsStore};
use passdeck::process::{Action, OutputTone};
use passdeck::ui::app::{MSG_CLEARED, MSG_COPIED};
use passdeck::ui::theme::Theme;
use passdeck::ui::App;
use std::fs;
use std::time::{Duration, Instant};
use tempfile::TempDir;

struct Fixture {
    app: App,
    clipboard: MemoryClipboard,
    _dir: TempDir,
}

/// Build an app over a small store with `email.gpg` at the top level.
fn create_app(configure: impl FnOnce(&mut Settings)) -> Fixture {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("store");
    fs::create_dir_all(store.join("web")).unwrap();
    fs::write(store.join("web/mail.gpg"), "x").unwrap();
    fs::write(store.join("email.gpg"), "x").unwrap();

    let mut settings = SettingsStore::open(dir.path().join("settings.json"));
    settings
        .update(|s| {
            s.pass_store = format!("{}/", store.display());
            configure(s);
        })
        .unwrap();

    let clipboard = MemoryClipboard::new();
    let app = App::new(
        settings,
        Box::new(clipboard.clone()),
        Theme::default_theme().clone(),
    )
    .unwrap();

    Fixture {
        app,
        clipboard,
        _dir: dir,
    }
}

fn select(app: &mut App, name: &str) {
    let index = app
        .visible_entries()
        .iter()
        .position(|e| e.name == name)
        .unwrap();
    app.selected_index = index;
}

fn wait_until_idle(app: &mut App) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while app.is_busy() {
        assert!(Instant::now() < deadline, "process did not finish");
        app.tick(Instant::now());
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn test_secret_first_line_goes_to_clipboard() {
    let mut f = create_app(|s| {
        s.use_pass = true;
        s.use_clipboard = true;
        s.pass_executable = "printf 'hunter2\\nuser: me\\n' #".to_string();
    });

    select(&mut f.app, "email.gpg");
    f.app.activate_selected();
    assert!(!f.app.controls_enabled());
    assert_eq!(f.app.pending_action(), Some(Action::Secret));

    wait_until_idle(&mut f.app);

    assert!(f.app.controls_enabled());
    assert_eq!(f.app.output.text(), "hunter2\nuser: me\n");
    assert_eq!(f.app.output.tone(), OutputTone::Normal);
    assert_eq!(f.clipboard.contents().as_deref(), Some("hunter2"));
    assert_eq!(f.app.status().map(|s| s.text.as_str()), Some(MSG_COPIED));
    assert_eq!(f.app.pending_clipboard_clears(), 0);
}

#[test]
fn test_pass_receives_entry_name() {
    let mut f = create_app(|s| {
        s.use_pass = true;
        s.pass_executable = "echo".to_string();
    });

    f.app.handle_right();
    select(&mut f.app, "mail.gpg");
    f.app.activate_selected();
    wait_until_idle(&mut f.app);

    assert_eq!(f.app.output.text(), "web/mail\n");
}

#[test]
fn test_gpg_mode_decrypts_file_directly() {
    let mut f = create_app(|s| {
        s.use_pass = false;
        s.gpg_executable = "echo".to_string();
    });

    select(&mut f.app, "email.gpg");
    f.app.activate_selected();
    wait_until_idle(&mut f.app);

    let text = f.app.output.text().trim_end().to_string();
    assert!(text.starts_with("--no-tty -dq "), "got {text:?}");
    assert!(text.ends_with("email.gpg"), "got {text:?}");
}

#[test]
fn test_clipboard_disabled_copies_nothing() {
    let mut f = create_app(|s| {
        s.use_pass = true;
        s.use_clipboard = false;
        s.pass_executable = "echo hunter2 #".to_string();
    });

    select(&mut f.app, "email.gpg");
    f.app.activate_selected();
    wait_until_idle(&mut f.app);

    assert_eq!(f.app.output.text(), "hunter2\n");
    assert_eq!(f.clipboard.write_count(), 0);
    assert!(f.app.status().is_none());
}

#[test]
fn test_autoclear_fires_once_after_delay() {
    let mut f = create_app(|s| {
        s.use_pass = true;
        s.use_clipboard = true;
        s.use_autoclear = true;
        s.autoclear_seconds = 30;
        s.pass_executable = "echo hunter2 #".to_string();
    });

    select(&mut f.app, "email.gpg");
    f.app.activate_selected();
    wait_until_idle(&mut f.app);

    assert_eq!(f.clipboard.contents().as_deref(), Some("hunter2"));
    assert_eq!(f.app.pending_clipboard_clears(), 1);

    f.app.tick(Instant::now() + Duration::from_secs(10));
    assert_eq!(f.clipboard.clear_count(), 0);

    f.app.tick(Instant::now() + Duration::from_secs(31));
    assert_eq!(f.clipboard.clear_count(), 1);
    assert_eq!(f.clipboard.contents(), None);
    assert_eq!(f.app.status().map(|s| s.text.as_str()), Some(MSG_CLEARED));

    f.app.tick(Instant::now() + Duration::from_secs(120));
    assert_eq!(f.clipboard.clear_count(), 1);
}

#[test]
fn test_autoclear_disabled_never_clears() {
    let mut f = create_app(|s| {
        s.use_pass = true;
        s.use_clipboard = true;
        s.use_autoclear = false;
        s.autoclear_seconds = 1;
        s.pass_executable = "echo hunter2 #".to_string();
    });

    select(&mut f.app, "email.gpg");
    f.app.activate_selected();
    wait_until_idle(&mut f.app);

    f.app.tick(Instant::now() + Duration::from_secs(3600));
    assert_eq!(f.clipboard.clear_count(), 0);
    assert_eq!(f.clipboard.contents().as_deref(), Some("hunter2"));
}

#[test]
fn test_stderr_turns_output_red() {
    let mut f = create_app(|s| {
        s.use_pass = true;
        s.use_clipboard = true;
        s.pass_executable = "echo 'gpg: decryption failed' >&2; exit 2 #".to_string();
    });

    select(&mut f.app, "email.gpg");
    f.app.activate_selected();
    wait_until_idle(&mut f.app);

    assert_eq!(f.app.output.tone(), OutputTone::Error);
    assert!(f.app.output.text().contains("gpg: decryption failed"));
    assert_eq!(f.clipboard.write_count(), 0);
}

#[test]
fn test_nonzero_exit_turns_output_red() {
    let mut f = create_app(|s| {
        s.use_pass = true;
        s.use_clipboard = true;
        s.pass_executable = "echo not found; exit 1 #".to_string();
    });

    select(&mut f.app, "email.gpg");
    f.app.activate_selected();
    wait_until_idle(&mut f.app);

    assert_eq!(f.app.output.text(), "not found\n");
    assert_eq!(f.app.output.tone(), OutputTone::Error);
    assert_eq!(f.clipboard.write_count(), 0);
}

#[test]
fn test_update_output_never_reaches_clipboard() {
    let mut f = create_app(|s| {
        s.use_pass = false;
        s.use_clipboard = true;
        s.git_executable = "echo".to_string();
    });

    f.app.update_store();
    assert_eq!(f.app.pending_action(), Some(Action::Git));
    wait_until_idle(&mut f.app);

    assert_eq!(f.app.output.text(), "pull\n");
    assert_eq!(f.clipboard.write_count(), 0);
}

#[test]
fn test_update_in_pass_mode_runs_pass_git_pull() {
    let mut f = create_app(|s| {
        s.use_pass = true;
        s.pass_executable = "echo".to_string();
    });

    f.app.update_store();
    wait_until_idle(&mut f.app);

    assert_eq!(f.app.output.text(), "git pull\n");
}

#[test]
fn test_second_action_is_ignored_while_busy() {
    let mut f = create_app(|s| {
        s.use_pass = true;
        s.pass_executable = "sleep 0.2; echo first #".to_string();
    });

    select(&mut f.app, "email.gpg");
    f.app.activate_selected();
    f.app.update_store();
    assert_eq!(f.app.pending_action(), Some(Action::Secret));

    wait_until_idle(&mut f.app);
    assert_eq!(f.app.output.text(), "first\n");
}

#[test]
fn test_new_run_clears_previous_output() {
    let mut f = create_app(|s| {
        s.use_pass = true;
        s.pass_executable = "echo".to_string();
    });

    f.app.update_store();
    wait_until_idle(&mut f.app);
    assert_eq!(f.app.output.text(), "git pull\n");

    select(&mut f.app, "email.gpg");
    f.app.activate_selected();
    wait_until_idle(&mut f.app);
    assert_eq!(f.app.output.text(), "email\n");
}
