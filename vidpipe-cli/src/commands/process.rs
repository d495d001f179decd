//! Implementation of the 'process' subcommand.
//!
//! Loads the pipeline configuration, wires up progress reporting and hands
//! the run to vidpipe-core. On success a short summary is printed on stdout.

use crate::cli::ProcessArgs;
use crate::error::CliResult;
use crate::progress::StageProgressBar;

use vidpipe_core::config::{PipelineSettings, PipelineSettingsBuilder};
use vidpipe_core::events::JsonProgressHandler;
use vidpipe_core::external::{CrateFfprobeExecutor, FfmpegSpawner, MediaProber, SidecarSpawner};
use vidpipe_core::{Pipeline, PipelineReport, PipelineSpec, check_dependency, file_size, format_bytes, format_duration};

use console::style;
use log::{debug, info};
use std::sync::Arc;

/// Runs `process` with the real ffmpeg and ffprobe.
pub fn run_process(args: ProcessArgs) -> CliResult<()> {
    if args.skip_checks {
        debug!("Skipping ffmpeg/ffprobe availability check");
    } else {
        check_dependency("ffmpeg")?;
        check_dependency("ffprobe")?;
    }

    let report = run_process_with(&args, &SidecarSpawner, &CrateFfprobeExecutor::new())?;
    if args.json_progress {
        println!("{}", summary_json(&report));
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn settings_from_args(args: &ProcessArgs) -> PipelineSettings {
    let mut builder = PipelineSettingsBuilder::new().keep_temp(args.keep_temp);
    if let Some(dir) = &args.temp_dir {
        builder = builder.temp_dir(dir.clone());
    }
    builder.build()
}

/// Loads and runs the configured pipeline against the given engine handles.
pub fn run_process_with(
    args: &ProcessArgs,
    spawner: &dyn FfmpegSpawner,
    prober: &dyn MediaProber,
) -> CliResult<PipelineReport> {
    let spec = PipelineSpec::from_file(&args.config)?;
    info!(
        "Loaded {} with {} module(s)",
        args.config.display(),
        spec.modules.len()
    );

    let mut pipeline = Pipeline::new(spec, settings_from_args(args));
    if args.json_progress {
        pipeline.add_handler(Arc::new(JsonProgressHandler::new()));
    } else {
        pipeline.add_handler(Arc::new(StageProgressBar::new()));
    }

    pipeline.process(spawner, prober, args.input.as_deref(), args.output.as_deref())
}

/// Final line of `--json-progress` output.
fn summary_json(report: &PipelineReport) -> serde_json::Value {
    serde_json::json!({
        "type": "summary",
        "run_id": report.run_id,
        "input": report.input.display().to_string(),
        "output": report.output.display().to_string(),
        "stages": report.stages.iter().map(|s| serde_json::json!({
            "stage": s.index + 1,
            "module": s.module,
            "elapsed_secs": s.elapsed.as_secs_f64(),
        })).collect::<Vec<_>>(),
        "elapsed_secs": report.elapsed.as_secs_f64(),
        "output_size": file_size(&report.output).ok(),
        "cleaned_up": report.cleaned_up,
    })
}

fn print_summary(report: &PipelineReport) {
    println!();
    println!("{}", style("Pipeline complete").green().bold());
    println!("  {} {}", style("Run:").bold(), report.run_id);
    println!("  {} {}", style("Input:").bold(), report.input.display());
    println!("  {} {}", style("Output:").bold(), report.output.display());
    for stage in &report.stages {
        println!(
            "    {:>2}. {:<24} {}",
            stage.index + 1,
            stage.module,
            format_duration(stage.elapsed.as_secs_f64())
        );
    }
    println!(
        "  {} {}",
        style("Total time:").bold(),
        format_duration(report.elapsed.as_secs_f64())
    );
    if let Ok(size) = file_size(&report.output) {
        println!("  {} {}", style("Output size:").bold(), format_bytes(size));
    }
    if let Some(dir) = report.run_dir.as_ref().filter(|_| !report.cleaned_up) {
        println!(
            "  {} {}",
            style("Intermediates kept in:").yellow(),
            dir.display()
        );
    }
}
