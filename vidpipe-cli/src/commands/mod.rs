//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Statically checks a pipeline configuration.
pub mod check;

/// Writes the sample pipeline configuration.
pub mod generate;

/// Lists the registered modules.
pub mod modules;

/// Runs a pipeline configuration through vidpipe-core.
pub mod process;
