//! Implementation of the 'check' subcommand.
//!
//! Constructs every module of a configuration the same way a run would,
//! which surfaces unknown module names, invalid parameters and missing
//! asset files without invoking ffmpeg.

use crate::cli::CheckArgs;
use crate::error::CliResult;

use vidpipe_core::{Pipeline, PipelineSettings, PipelineSpec};

use console::style;
use log::info;

/// One line per stage: position, configured name, resolved module and its
/// filter graph when the module builds one up front.
pub fn describe_stages(spec: PipelineSpec) -> CliResult<Vec<String>> {
    let names: Vec<String> = spec.modules.iter().map(|m| m.name.clone()).collect();
    let pipeline = Pipeline::new(spec, PipelineSettings::default());
    let modules = pipeline.resolve_modules()?;

    Ok(names
        .iter()
        .zip(&modules)
        .enumerate()
        .map(|(i, (name, module))| {
            let mut line = format!("{:>2}. {} -> {}", i + 1, name, module.name());
            if let Some(graph) = module.filter_graph() {
                line.push_str(&format!("\n      {graph}"));
            }
            line
        })
        .collect())
}

pub fn run_check(args: CheckArgs) -> CliResult<()> {
    let spec = PipelineSpec::from_file(&args.config)?;
    let input = spec.input.clone();
    let output = spec.output.clone();
    info!("Checking {}", args.config.display());

    let lines = describe_stages(spec)?;

    println!("{}", style("Configuration OK").green().bold());
    if let Some(input) = input {
        println!("  {} {}", style("Input:").bold(), input.display());
    }
    if let Some(output) = output {
        println!("  {} {}", style("Output:").bold(), output.display());
    }
    for line in lines {
        println!("  {line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidpipe_core::ErrorKind;

    #[test]
    fn describes_each_stage_with_its_graph() {
        let spec = PipelineSpec::from_yaml_str(
            "modules:\n  - name: crop\n    params: { width: 640, height: 360, position: topleft }\n  - name: deleteaudio\n",
        )
        .unwrap();
        let lines = describe_stages(spec).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" 1. crop -> crop"));
        assert!(lines[0].contains("[0:v]crop=640:360:0:0[out]"));
        assert_eq!(lines[1], " 2. deleteaudio -> deleteaudio");
    }

    #[test]
    fn unknown_module_fails_resolution() {
        let spec = PipelineSpec::from_yaml_str("modules:\n  - name: sparkle\n").unwrap();
        let err = describe_stages(spec).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);
    }
}
