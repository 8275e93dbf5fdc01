//! Clipboard backends.
//!
//! The system clipboard is reached through whatever helper the session
//! provides: `wl-copy` on Wayland, `xclip` on X11, `pbcopy` on macOS. When
//! none applies (a bare console, an SSH session) the text is handed to the
//! terminal emulator with an OSC 52 escape sequence instead.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::cell::RefCell;
use std::env;
use std::io::Write;
use std::process::{Command, Stdio};
use std::rc::Rc;

/// Somewhere a secret can be copied to and later wiped from.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
    fn clear(&mut self) -> Result<()>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// A clipboard driven by an external helper program that reads the new
/// contents on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandClipboard {
    program: &'static str,
    args: &'static [&'static str],
    /// Arguments that clear the clipboard without reading stdin. When `None`
    /// the clipboard is cleared by copying an empty string.
    clear_args: Option<&'static [&'static str]>,
}

impl CommandClipboard {
    pub const fn wayland() -> Self {
        Self {
            program: "wl-copy",
            args: &[],
            clear_args: Some(&["--clear"]),
        }
    }

    pub const fn x11() -> Self {
        Self {
            program: "xclip",
            args: &["-in", "-selection", "clipboard"],
            clear_args: None,
        }
    }

    pub const fn macos() -> Self {
        Self {
            program: "pbcopy",
            args: &[],
            clear_args: None,
        }
    }

    fn feed(&self, contents: &str) -> Result<()> {
        let mut child = Command::new(self.program)
            .args(self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to spawn {}", self.program))?;

        child
            .stdin
            .take()
            .context("stdin wasn't captured")?
            .write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write to {}", self.program))?;

        let status = child
            .wait()
            .with_context(|| format!("Failed to wait for {}", self.program))?;
        if !status.success() {
            anyhow::bail!("{} exited with {}", self.program, status);
        }
        Ok(())
    }
}

impl Clipboard for CommandClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.feed(text)
    }

    fn clear(&mut self) -> Result<()> {
        match self.clear_args {
            Some(args) => {
                let status = Command::new(self.program)
                    .args(args)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .status()
                    .with_context(|| format!("Failed to spawn {}", self.program))?;
                if !status.success() {
                    anyhow::bail!("{} exited with {}", self.program, status);
                }
                Ok(())
            }
            None => self.feed(""),
        }
    }

    fn name(&self) -> &str {
        self.program
    }
}

/// Sets the clipboard by asking the terminal emulator to do it (OSC 52).
pub struct Osc52Clipboard<W: Write> {
    out: W,
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, payload: &str) -> Result<()> {
        write!(self.out, "{}", osc52_sequence(payload)).context("Failed to write OSC 52")?;
        self.out.flush().context("Failed to flush OSC 52")?;
        Ok(())
    }
}

impl<W: Write> Clipboard for Osc52Clipboard<W> {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.emit(text)
    }

    fn clear(&mut self) -> Result<()> {
        self.emit("")
    }

    fn name(&self) -> &str {
        "osc52"
    }
}

/// `ESC ] 52 ; c ; <base64> BEL`
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

/// An in-process clipboard. Clones share the same contents, so a caller can
/// keep a handle while the original is boxed away.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Rc<RefCell<Option<String>>>,
    writes: Rc<RefCell<usize>>,
    clears: Rc<RefCell<usize>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }

    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }

    pub fn clear_count(&self) -> usize {
        *self.clears.borrow()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        *self.contents.borrow_mut() = Some(text.to_string());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        *self.contents.borrow_mut() = None;
        *self.clears.borrow_mut() += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Pick the clipboard backend for the current session.
pub fn detect() -> Box<dyn Clipboard> {
    if env::var_os("WAYLAND_DISPLAY").is_some() {
        Box::new(CommandClipboard::wayland())
    } else if env::var_os("DISPLAY").is_some() {
        Box::new(CommandClipboard::x11())
    } else if cfg!(target_os = "macos") {
        Box::new(CommandClipboard::macos())
    } else {
        Box::new(Osc52Clipboard::new(std::io::stdout()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osc52_sequence() {
        assert_eq!(osc52_sequence("hunter2"), "\x1b]52;c;aHVudGVyMg==\x07");
        assert_eq!(osc52_sequence(""), "\x1b]52;c;\x07");
    }

    #[test]
    fn test_osc52_clipboard_writes_sequences() {
        let mut clipboard = Osc52Clipboard::new(Vec::new());
        clipboard.set_text("hunter2").expect("set");
        clipboard.clear().expect("clear");

        let written = String::from_utf8(clipboard.into_inner()).expect("utf8");
        assert_eq!(written, "\x1b]52;c;aHVudGVyMg==\x07\x1b]52;c;\x07");
    }

    #[test]
    fn test_memory_clipboard_shares_state_between_clones() {
        let handle = MemoryClipboard::new();
        let mut boxed: Box<dyn Clipboard> = Box::new(handle.clone());

        boxed.set_text("secret").expect("set");
        assert_eq!(handle.contents().as_deref(), Some("secret"));
        assert_eq!(handle.write_count(), 1);

        boxed.clear().expect("clear");
        assert_eq!(handle.contents(), None);
        assert_eq!(handle.clear_count(), 1);
    }

    #[test]
    fn test_command_clipboard_missing_helper_is_an_error() {
        let mut clipboard = CommandClipboard {
            program: "definitely-not-a-clipboard-helper",
            args: &[],
            clear_args: None,
        };
        assert!(clipboard.set_text("x").is_err());
        assert!(clipboard.clear().is_err());
    }

    #[test]
    fn test_command_clipboard_names() {
        assert_eq!(CommandClipboard::wayland().name(), "wl-copy");
        assert_eq!(CommandClipboard::x11().name(), "xclip");
        assert_eq!(CommandClipboard::macos().name(), "pbcopy");
    }
}
