// ============================================================================
// vidpipe-cli/src/main.rs
// ============================================================================
//
// MAIN ENTRY POINT: vidpipe command-line application
//
// Parses the command line, installs logging and dispatches to the command
// implementations in `commands/`. Any error is printed once, in red, and the
// process exits with status 1.
//
// KEY COMPONENTS:
// - Argument parsing (clap)
// - Logging initialization (fern)
// - Command dispatch

use clap::Parser;
use console::style;
use log::LevelFilter;
use std::process;

use vidpipe_cli::logging::init_logging;
use vidpipe_cli::{
    Cli, CliResult, Commands, run_check, run_generate, run_modules, run_process,
};

fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Process(args) => {
            init_logging(args.log_level.into(), args.log_file.as_deref())?;
            run_process(args)
        }
        Commands::Check(args) => {
            init_logging(LevelFilter::Warn, None)?;
            run_check(args)
        }
        Commands::Generate(args) => {
            init_logging(LevelFilter::Warn, None)?;
            run_generate(args)
        }
        Commands::Modules => run_modules(),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        process::exit(1);
    }
}
