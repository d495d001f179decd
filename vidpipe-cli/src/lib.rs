// vidpipe-cli/src/lib.rs
//
// Library portion of the vidpipe CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod progress;

// Re-export items needed by the binary or integration tests
pub use cli::{CheckArgs, Cli, Commands, GenerateArgs, LogLevel, ProcessArgs};
pub use commands::check::run_check;
pub use commands::generate::run_generate;
pub use commands::modules::run_modules;
pub use commands::process::run_process;
pub use error::{CliErrorContext, CliResult};
