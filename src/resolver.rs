//! # Executable Resolver
//!
//! Finds the `pass`, `git` and `gpg` executables on first run.
//!
//! Each missing path in [`Settings`] is probed once with `which <tool>`;
//! `gpg2` is preferred over `gpg`. Probes block until `which` exits, which is
//! fine for a handful of start-up lookups. Nothing is retried: a tool that is
//! not found simply leaves its path empty, and when neither `pass` nor the
//! `git` + `gpg` pair is available the caller opens the settings dialog.

use crate::config::Settings;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Something that can look up an executable by name.
///
/// Production code uses [`WhichProbe`]; tests inject a fixed table.
pub trait ToolProbe {
    /// Return the absolute path of `tool`, or `None` if it cannot be found.
    fn locate(&self, tool: &str) -> Option<String>;
}

/// Probes the host `PATH` by running `which <tool>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhichProbe;

impl ToolProbe for WhichProbe {
    fn locate(&self, tool: &str) -> Option<String> {
        let output = match Command::new("which")
            .arg(tool)
            .stdin(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                warn!("failed to run `which {}`: {}", tool, e);
                return None;
            }
        };

        if !output.status.success() {
            debug!("`which {}` exited with {}", tool, output.status);
            return None;
        }

        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if path.is_empty() {
            None
        } else {
            Some(path)
        }
    }
}

/// What a resolution pass did to the settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolution {
    /// At least one setting was filled in and should be persisted.
    pub changed: bool,
    /// Not enough tools are known; the user must configure them by hand.
    pub needs_manual_config: bool,
}

/// Fill in every empty executable path that `probe` can find.
pub fn resolve_missing(settings: &mut Settings, probe: &dyn ToolProbe) -> Resolution {
    let mut changed = false;

    if settings.pass_executable.is_empty() {
        if let Some(path) = probe.locate("pass") {
            info!("found pass at {}", path);
            settings.pass_executable = path;
            settings.use_pass = true;
            changed = true;
        }
    }

    if settings.git_executable.is_empty() {
        if let Some(path) = probe.locate("git") {
            info!("found git at {}", path);
            settings.git_executable = path;
            changed = true;
        }
    }

    if settings.gpg_executable.is_empty() {
        if let Some(path) = probe.locate("gpg2").or_else(|| probe.locate("gpg")) {
            info!("found gpg at {}", path);
            settings.gpg_executable = path;
            changed = true;
        }
    }

    let needs_manual_config = !settings.has_usable_tools();
    if needs_manual_config {
        warn!("neither pass nor git + gpg could be located");
    }

    Resolution {
        changed,
        needs_manual_config,
    }
}
