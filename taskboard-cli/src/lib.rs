//! Taskboard CLI library
//!
//! The binary in `main.rs` parses [`Cli`] and dispatches to [`commands`]. Commands return
//! an exit code so that a rolled-back move can fail the process without being an error.

pub mod cli;
pub mod commands;
pub mod table;

pub use cli::{Cli, Commands, MoveTarget};
