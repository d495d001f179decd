//! Implementation of the 'generate' subcommand.

use crate::cli::GenerateArgs;
use crate::error::{CliErrorContext, CliResult};

use vidpipe_core::{CoreError, sample_pipeline};

use log::info;
use std::fs;

pub fn run_generate(args: GenerateArgs) -> CliResult<()> {
    if args.output.exists() && !args.force {
        return Err(CoreError::OperationFailed(format!(
            "'{}' already exists (use --force to overwrite)",
            args.output.display()
        )));
    }

    let yaml = sample_pipeline().to_yaml_string()?;
    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .cli_with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    fs::write(&args.output, yaml)
        .cli_with_context(|| format!("Failed to write '{}'", args.output.display()))?;

    info!("Wrote sample configuration to {}", args.output.display());
    println!("{}", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidpipe_core::PipelineSpec;

    #[test]
    fn writes_parseable_sample_and_refuses_to_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("configs").join("pipeline.yaml");

        run_generate(GenerateArgs { output: output.clone(), force: false }).unwrap();
        let spec = PipelineSpec::from_file(&output).unwrap();
        assert!(!spec.modules.is_empty());

        let err = run_generate(GenerateArgs { output: output.clone(), force: false }).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        run_generate(GenerateArgs { output, force: true }).unwrap();
    }
}
