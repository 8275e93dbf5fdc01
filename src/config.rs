//! # Settings Persistence
//!
//! Manages user settings stored in the platform config directory, e.g.
//! `~/.config/passdeck/settings.json` on Linux.
//!
//! ## Overview
//!
//! The [`Settings`] struct is a flat key/value record serialized to / from a
//! JSON document. Keys use camelCase so the file reads the same way the
//! settings are named in the UI:
//!
//! ```json
//! {
//!   "usePass": true,
//!   "useClipboard": true,
//!   "useAutoclear": false,
//!   "autoclearSeconds": 10,
//!   "passStore": "/home/user/.password-store/",
//!   "passExecutable": "/usr/bin/pass",
//!   "gitExecutable": "/usr/bin/git",
//!   "gpgExecutable": "/usr/bin/gpg2"
//! }
//! ```
//!
//! Every field is optional on disk; missing keys take their default value.
//! [`SettingsStore`] binds a `Settings` value to the file it is persisted in,
//! so every mutation can be written back immediately.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Organisation half of the settings namespace.
pub const ORGANIZATION: &str = "passdeck";

/// Application half of the settings namespace.
pub const APPLICATION: &str = "passdeck";

/// File name of the settings document inside the config directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Autoclear delay used when nothing has been configured yet.
pub const DEFAULT_AUTOCLEAR_SECONDS: u32 = 10;

/// Persisted user settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Run operations through `pass` rather than `git` / `gpg` directly.
    pub use_pass: bool,
    /// Copy the first line of a retrieved secret to the clipboard.
    pub use_clipboard: bool,
    /// Clear the clipboard some time after a secret was copied.
    pub use_autoclear: bool,
    /// Delay before the clipboard is cleared.
    pub autoclear_seconds: u32,
    /// Root of the password store. Empty means "not configured".
    pub pass_store: String,
    pub pass_executable: String,
    pub git_executable: String,
    pub gpg_executable: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_pass: false,
            use_clipboard: false,
            use_autoclear: false,
            autoclear_seconds: DEFAULT_AUTOCLEAR_SECONDS,
            pass_store: String::new(),
            pass_executable: String::new(),
            git_executable: String::new(),
            gpg_executable: String::new(),
        }
    }
}

impl Settings {
    /// Load settings from a specific path. Returns `Settings::default()` if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        let settings: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))?;
        Ok(settings)
    }

    /// Save the settings to a specific path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }

        let contents =
            serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;

        Ok(())
    }

    /// Fill in the store path with the default location when it is empty.
    ///
    /// Returns `true` if the value changed.
    pub fn ensure_store_path(&mut self) -> bool {
        if !self.pass_store.is_empty() {
            return false;
        }
        match default_store_path() {
            Some(path) => {
                self.pass_store = path;
                true
            }
            None => false,
        }
    }

    /// Whether enough executables are known to do anything useful: either
    /// `pass`, or both `git` and `gpg`.
    pub fn has_usable_tools(&self) -> bool {
        !self.pass_executable.is_empty()
            || (!self.git_executable.is_empty() && !self.gpg_executable.is_empty())
    }
}

/// The default password store: `~/.password-store/`.
///
/// The trailing separator matters: it is stripped together with the store
/// root when deriving entry names.
pub fn default_store_path() -> Option<String> {
    let dirs = directories::BaseDirs::new()?;
    let mut path = dirs.home_dir().join(".password-store").display().to_string();
    path.push('/');
    Some(path)
}

/// Return the platform path of the settings file.
pub fn default_settings_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", ORGANIZATION, APPLICATION)
        .context("Could not determine config directory")?;
    Ok(dirs.config_dir().join(SETTINGS_FILE))
}

/// A [`Settings`] value bound to the file it is persisted in.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Open the store at `path`. A missing or unreadable file yields default
    /// settings; the file is only written on the first save.
    pub fn open(path: PathBuf) -> Self {
        let settings = match Settings::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("{:#}; falling back to default settings", e);
                Settings::default()
            }
        };
        debug!("loaded settings from {}", path.display());
        Self { path, settings }
    }

    /// Open the store at the platform default location.
    pub fn open_default() -> Result<Self> {
        Ok(Self::open(default_settings_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Apply a mutation and persist the result immediately.
    pub fn update<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Settings),
    {
        f(&mut self.settings);
        self.save()
    }

    /// Replace all settings and persist them immediately.
    pub fn replace(&mut self, settings: Settings) -> Result<()> {
        self.settings = settings;
        self.save()
    }

    pub fn save(&self) -> Result<()> {
        self.settings.save_to(&self.path)?;
        info!("saved settings to {}", self.path.display());
        Ok(())
    }
}
