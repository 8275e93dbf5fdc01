//! # Process Module
//!
//! Everything needed to run a password-store operation and show its result.
//!
//! | Piece | Purpose |
//! |-------|---------|
//! | [`command`] | Builds `sh -c` command lines for update and retrieval |
//! | [`runner`] | Runs one process at a time and reports readiness, errors and exit |
//! | [`output`] | Accumulates the text shown in the output pane and its colour |

pub mod command;
pub mod output;
pub mod runner;

pub use command::{
    command_line, secret_invocation, secret_name, update_invocation, Action, Invocation,
};
pub use output::{OutputTone, OutputView};
pub use runner::{ExitKind, ProcessError, ProcessEvent, ProcessRunner};
