//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Module containing the implementation of the `check` command.
/// This command probes every video in a directory and reports unplayable files.
pub mod check;
