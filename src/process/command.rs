//! Building the shell command lines passdeck runs.
//!
//! Every operation is a single executable path plus a single argument string.
//! The two are joined with one space and handed to `sh -c` unescaped, so an
//! argument string may carry several words (`git pull`, `--no-tty -dq FILE`).

use crate::config::Settings;
use std::path::Path;

/// Shell used to run every command line.
pub const SHELL: &str = "sh";

/// Suffix of encrypted entries in a password store.
pub const SECRET_SUFFIX: &str = ".gpg";

/// What the running process is doing, decided right before launch and read
/// back when it finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Synchronising the store (`git pull`). Output is only displayed.
    Git,
    /// Decrypting a single entry. Output may go to the clipboard.
    Secret,
}

/// A ready-to-run operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub action: Action,
    pub program: String,
    pub args: String,
}

impl Invocation {
    /// The string passed to `sh -c`.
    pub fn command_line(&self) -> String {
        command_line(&self.program, &self.args)
    }
}

/// Join an executable path and its argument string into one command line.
pub fn command_line(program: &str, args: &str) -> String {
    format!("{} {}", program, args)
}

/// The "update" operation: pull the store from its git remote.
pub fn update_invocation(settings: &Settings) -> Invocation {
    if settings.use_pass {
        Invocation {
            action: Action::Git,
            program: settings.pass_executable.clone(),
            args: "git pull".to_string(),
        }
    } else {
        Invocation {
            action: Action::Git,
            program: settings.git_executable.clone(),
            args: "pull".to_string(),
        }
    }
}

/// Decrypt the entry stored in `file`.
///
/// In pass mode the entry name is passed to `pass`; otherwise `gpg` decrypts
/// the file directly.
pub fn secret_invocation(settings: &Settings, file: &Path) -> Invocation {
    let file = file.display().to_string();
    if settings.use_pass {
        Invocation {
            action: Action::Secret,
            program: settings.pass_executable.clone(),
            args: secret_name(&settings.pass_store, &file),
        }
    } else {
        Invocation {
            action: Action::Secret,
            program: settings.gpg_executable.clone(),
            args: format!("--no-tty -dq {}", file),
        }
    }
}

/// Turn a file path inside the store into a `pass` entry name by removing
/// the store root and the `.gpg` suffix.
///
/// `/home/me/.password-store/web/mail.gpg` with store
/// `/home/me/.password-store/` becomes `web/mail`.
pub fn secret_name(store: &str, file: &str) -> String {
    let relative = match file.strip_prefix(store) {
        Some(rest) if !store.is_empty() => rest.trim_start_matches('/'),
        _ => file,
    };
    relative
        .strip_suffix(SECRET_SUFFIX)
        .unwrap_or(relative)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn pass_settings() -> Settings {
        Settings {
            use_pass: true,
            pass_store: "/home/me/.password-store/".to_string(),
            pass_executable: "/usr/bin/pass".to_string(),
            git_executable: "/usr/bin/git".to_string(),
            gpg_executable: "/usr/bin/gpg2".to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_command_line_joins_with_single_space() {
        assert_eq!(command_line("/usr/bin/pass", "git pull"), "/usr/bin/pass git pull");
        assert_eq!(command_line("pass", "web/mail"), "pass web/mail");
        assert_eq!(
            command_line("/opt/my tools/gpg", "--no-tty -dq a b.gpg"),
            "/opt/my tools/gpg --no-tty -dq a b.gpg"
        );
    }

    #[test]
    fn test_command_line_does_not_escape() {
        assert_eq!(command_line("echo", "'$HOME' \"x\""), "echo '$HOME' \"x\"");
    }

    #[test]
    fn test_update_in_pass_mode() {
        let invocation = update_invocation(&pass_settings());
        assert_eq!(invocation.action, Action::Git);
        assert_eq!(invocation.command_line(), "/usr/bin/pass git pull");
    }

    #[test]
    fn test_update_with_git() {
        let settings = Settings {
            use_pass: false,
            ..pass_settings()
        };
        let invocation = update_invocation(&settings);
        assert_eq!(invocation.action, Action::Git);
        assert_eq!(invocation.command_line(), "/usr/bin/git pull");
    }

    #[test]
    fn test_secret_in_pass_mode() {
        let file = PathBuf::from("/home/me/.password-store/web/mail.gpg");
        let invocation = secret_invocation(&pass_settings(), &file);
        assert_eq!(invocation.action, Action::Secret);
        assert_eq!(invocation.command_line(), "/usr/bin/pass web/mail");
    }

    #[test]
    fn test_secret_with_gpg() {
        let settings = Settings {
            use_pass: false,
            ..pass_settings()
        };
        let file = PathBuf::from("/home/me/.password-store/web/mail.gpg");
        let invocation = secret_invocation(&settings, &file);
        assert_eq!(invocation.action, Action::Secret);
        assert_eq!(
            invocation.command_line(),
            "/usr/bin/gpg2 --no-tty -dq /home/me/.password-store/web/mail.gpg"
        );
    }

    #[test]
    fn test_secret_name_variants() {
        assert_eq!(
            secret_name("/store/", "/store/web/mail.gpg"),
            "web/mail"
        );
        // Store configured without a trailing separator.
        assert_eq!(secret_name("/store", "/store/web/mail.gpg"), "web/mail");
        assert_eq!(secret_name("/store/", "/store/top.gpg"), "top");
        // Not an encrypted entry: only the prefix goes.
        assert_eq!(secret_name("/store/", "/store/notes.txt"), "notes.txt");
        // Only the trailing suffix is removed.
        assert_eq!(secret_name("/store/", "/store/a.gpg.bak.gpg"), "a.gpg.bak");
        // Outside the store the path is kept as-is.
        assert_eq!(secret_name("/store/", "/elsewhere/x.gpg"), "/elsewhere/x");
    }
}
