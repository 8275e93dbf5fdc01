//! # Store Module
//!
//! A browsable view of the password store directory.
//!
//! The store is read straight from the filesystem: directories become
//! expandable nodes and files become entries that can be decrypted. Dotfiles
//! such as `.git` and `.gpg-id` are not shown.

mod tree;

pub use tree::{is_secret_file, StoreEntry, StoreTree};
