// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module for replaying recorded detector outputs.
//!
//! This module contains the command-line interface logic, including argument
//! parsing and the `replay` and `config` command implementations.

// Modules
/// CLI arguments.
pub mod args;

/// Console output macros.
pub mod logging;

/// Replay logic.
pub mod replay;

/// Effective configuration printing.
pub mod show_config;
