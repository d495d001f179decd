//! Runs another module on a side input/output pair, outside the main chain.
//!
//! The wrapped module reads `custom_input` and writes `custom_output`. The
//! pipeline continues with either the untouched stage input or, with
//! `copy_to_pipeline`, the wrapped module's result.

use crate::config::{ModuleParams, ModuleSpec};
use crate::error::CoreResult;
use crate::modules::{StageContext, TransformModule, copy_through, require_asset};
use crate::registry;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct ModuleWrapper {
    module_name: String,
    inner: Box<dyn TransformModule>,
    custom_input: PathBuf,
    custom_output: PathBuf,
    copy_to_pipeline: bool,
}

impl ModuleWrapper {
    pub const NAME: &'static str = "utility.module_wrapper";

    pub fn from_params(params: &ModuleParams) -> CoreResult<Self> {
        let r = params.reader(Self::NAME);
        let module_name = r.require_string("module_name")?;
        let custom_input = require_asset(Self::NAME, r.require_path("custom_input")?)?;
        let custom_output = r.require_path("custom_output")?;

        let inner = registry::build(&ModuleSpec::new(&module_name, r.params("module_params")?))?;
        Ok(Self {
            module_name,
            inner,
            custom_input,
            custom_output,
            copy_to_pipeline: r.bool_or("copy_to_pipeline", false)?,
        })
    }
}

impl TransformModule for ModuleWrapper {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, ctx: &StageContext<'_>, input: &Path, output: &Path) -> CoreResult<()> {
        if let Some(parent) = self.custom_output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        log::info!(
            "{} Running {} on {} -> {}",
            ctx.tag(),
            self.module_name,
            self.custom_input.display(),
            self.custom_output.display()
        );
        self.inner.process(ctx, &self.custom_input, &self.custom_output)?;

        let source = if self.copy_to_pipeline {
            self.custom_output.as_path()
        } else {
            input
        };
        copy_through(source, output)?;
        log::debug!("{} {} copied to {}", ctx.tag(), source.display(), output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::external::mocks::{MockFfmpegSpawner, MockMediaProber};
    use crate::modules::test_support::{context, single_call};
    use serde_json::json;

    fn wrapper(dir: &Path, copy_to_pipeline: bool) -> ModuleWrapper {
        let side = dir.join("side.mp4");
        std::fs::write(&side, b"side").unwrap();
        let params = ModuleParams::new()
            .with("module_name", "resize")
            .with("module_params", json!({"width": 640, "height": 360}))
            .with("custom_input", side.to_string_lossy().into_owned())
            .with("custom_output", dir.join("side/small.mp4").to_string_lossy().into_owned())
            .with("copy_to_pipeline", copy_to_pipeline);
        ModuleWrapper::from_params(&params).unwrap()
    }

    #[test]
    fn runs_inner_module_on_side_paths() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("main.mp4");
        std::fs::write(&input, b"main").unwrap();
        let output = dir.path().join("stage.mp4");
        let spawner = MockFfmpegSpawner::succeeding();
        let prober = MockMediaProber::new();

        wrapper(dir.path(), false)
            .process(&context(&spawner, &prober), &input, &output)
            .unwrap();

        let args = single_call(&spawner);
        assert!(args.iter().any(|a| a.ends_with("side.mp4")));
        assert!(args.iter().any(|a| a.contains("scale=640:360")));
        assert!(dir.path().join("side/small.mp4").exists());
        assert_eq!(std::fs::read(&output).unwrap(), b"main");
    }

    #[test]
    fn copy_to_pipeline_forwards_the_side_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("stage.mp4");
        let spawner = MockFfmpegSpawner::succeeding();
        let prober = MockMediaProber::new();

        wrapper(dir.path(), true)
            .process(&context(&spawner, &prober), Path::new("unused.mp4"), &output)
            .unwrap();
        assert_eq!(std::fs::read(&output).unwrap(), b"mock");
    }

    #[test]
    fn unknown_inner_module_fails_at_construction() {
        let dir = tempfile::tempdir().unwrap();
        let side = dir.path().join("side.mp4");
        std::fs::write(&side, b"side").unwrap();
        let params = ModuleParams::new()
            .with("module_name", "sharpen")
            .with("custom_input", side.to_string_lossy().into_owned())
            .with("custom_output", "out.mp4");
        assert_eq!(
            ModuleWrapper::from_params(&params).unwrap_err().kind(),
            ErrorKind::Resolution
        );
    }
}
