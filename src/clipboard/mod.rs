//! # Clipboard Module
//!
//! Copies retrieved secrets to the clipboard and wipes them again later.
//!
//! Only the first non-empty line of a secret is copied: by `pass` convention
//! that is the password itself, with any following lines holding metadata.
//!
//! - [`backend`] - where the text goes (`wl-copy`, `xclip`, `pbcopy`, OSC 52)
//! - [`autoclear`] - deferred one-shot clears

pub mod autoclear;
pub mod backend;

pub use autoclear::AutoclearTimer;
pub use backend::{Clipboard, CommandClipboard, MemoryClipboard, Osc52Clipboard};

use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// The first newline-delimited line that is not empty.
pub fn first_line(text: &str) -> Option<&str> {
    text.split('\n').find(|line| !line.is_empty())
}

/// What [`ClipboardManager::copy_first_line`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The line was copied; `autoclear` says whether a clear was armed.
    Copied { autoclear: bool },
    /// The output had no non-empty line.
    NothingToCopy,
}

/// A clipboard backend plus its pending autoclear deadlines.
pub struct ClipboardManager {
    backend: Box<dyn Clipboard>,
    timer: AutoclearTimer,
}

impl ClipboardManager {
    pub fn new(backend: Box<dyn Clipboard>) -> Self {
        Self {
            backend,
            timer: AutoclearTimer::new(),
        }
    }

    /// Copy the first line of `output`, arming a clear after
    /// `autoclear` if one is given.
    pub fn copy_first_line(
        &mut self,
        output: &str,
        autoclear: Option<Duration>,
        now: Instant,
    ) -> Result<CopyOutcome> {
        let Some(line) = first_line(output) else {
            debug!("no line to copy");
            return Ok(CopyOutcome::NothingToCopy);
        };

        self.backend.set_text(line)?;
        info!("copied secret to clipboard via {}", self.backend.name());

        if let Some(delay) = autoclear {
            self.timer.schedule(now, delay);
            debug!("clipboard clear armed in {}s", delay.as_secs());
        }

        Ok(CopyOutcome::Copied {
            autoclear: autoclear.is_some(),
        })
    }

    /// Clear the clipboard if any deadline has passed. Returns whether a
    /// clear happened.
    pub fn poll(&mut self, now: Instant) -> Result<bool> {
        let fired = self.timer.take_due(now);
        if fired == 0 {
            return Ok(false);
        }
        for _ in 0..fired {
            self.backend.clear()?;
        }
        info!("clipboard cleared");
        Ok(true)
    }

    pub fn pending_clears(&self) -> usize {
        self.timer.pending()
    }
}
