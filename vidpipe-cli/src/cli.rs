// vidpipe-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Vidpipe: Declarative video transformation pipelines",
    long_about = "Runs a sequence of ffmpeg-backed transformation modules described in a YAML or JSON file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Runs a pipeline configuration against an input video
    Process(ProcessArgs),
    /// Loads a configuration and constructs every module without running ffmpeg
    Check(CheckArgs),
    /// Writes a sample pipeline configuration
    Generate(GenerateArgs),
    /// Lists the registered transformation modules
    Modules,
}

/// Console log verbosity.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug)]
pub struct ProcessArgs {
    /// Pipeline configuration file (.yaml, .yml or .json)
    #[arg(short = 'c', long = "config", required = true, value_name = "CONFIG")]
    pub config: PathBuf,

    /// Optional: Input video, overrides the configuration's `input`
    #[arg(short = 'i', long = "input", value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Optional: Output video, overrides the configuration's `output`
    #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Console log level
    #[arg(short = 'l', long = "log-level", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Optional: Also write the log to this file
    #[arg(long, value_name = "LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Skip the ffmpeg/ffprobe availability check
    #[arg(long)]
    pub skip_checks: bool,

    /// Optional: Directory for intermediate stage files (defaults to the output directory)
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Keep intermediate stage files after a successful run
    #[arg(long)]
    pub keep_temp: bool,

    /// Print one JSON object per pipeline event on stdout instead of a progress bar
    #[arg(long)]
    pub json_progress: bool,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Pipeline configuration file (.yaml, .yml or .json)
    #[arg(short = 'c', long = "config", required = true, value_name = "CONFIG")]
    pub config: PathBuf,
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Where to write the sample configuration
    #[arg(short = 'o', long = "output", default_value = "pipeline.yaml", value_name = "PATH")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(short = 'f', long = "force")]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_arguments_parse() {
        let cli = Cli::try_parse_from([
            "vidpipe", "process", "-c", "p.yaml", "-o", "out.mp4", "-l", "debug", "--keep-temp",
        ])
        .unwrap();
        match cli.command {
            Commands::Process(args) => {
                assert_eq!(args.config, PathBuf::from("p.yaml"));
                assert_eq!(args.output, Some(PathBuf::from("out.mp4")));
                assert!(args.input.is_none());
                assert_eq!(args.log_level, LogLevel::Debug);
                assert!(args.keep_temp);
                assert!(!args.json_progress);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn generate_defaults_to_pipeline_yaml() {
        let cli = Cli::try_parse_from(["vidpipe", "generate"]).unwrap();
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.output, PathBuf::from("pipeline.yaml"));
                assert!(!args.force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn process_requires_config() {
        assert!(Cli::try_parse_from(["vidpipe", "process"]).is_err());
    }
}
