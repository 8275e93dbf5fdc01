//! # UI Module
//!
//! The terminal user interface for passdeck.
//!
//! ## Components
//!
//! - [`App`] - application state: store tree, output, running process, clipboard
//! - [`mod@render`] - drawing the TUI
//! - [`input`] - key bindings
//! - [`dialog`] - the settings form
//! - [`theme`] - colour palettes
//!
//! ## Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │  passdeck  ~/.password-store/                    │
//! ├─────────────────────┬───────────────────────────┤
//! │                     │                           │
//! │   Store tree        │      Output               │
//! │   (directories &    │   (stdout, or red when    │
//! │    entries)         │    anything failed)       │
//! │                     │                           │
//! ├─────────────────────┴───────────────────────────┤
//! │  status message / key help                       │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod dialog;
pub mod input;
pub mod render;
pub mod theme;

pub use app::App;
pub use render::render;
