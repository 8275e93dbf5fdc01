//! passdeck - a terminal front-end for `pass`
//!
//! This library provides the pieces of the application: settings
//! persistence, executable discovery, running password-store commands,
//! browsing the store and copying secrets to the clipboard.

pub mod clipboard;
pub mod config;
pub mod logging;
pub mod process;
pub mod resolver;
pub mod store;
pub mod ui;
