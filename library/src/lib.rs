//! mapdeck command-line front end
//!
//! Wires the catalog scanner to a terminal: configuration and flag
//! handling, user prompts, and the `list`, `show` and `roots` commands.

pub mod commands;
#[cfg(feature = "native-dialogs")]
pub mod dialogs;
pub mod terminal;
