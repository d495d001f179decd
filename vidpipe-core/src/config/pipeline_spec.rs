// ============================================================================
// vidpipe-core/src/config/pipeline_spec.rs
// ============================================================================
//
// PIPELINE DESCRIPTION: Declarative Pipeline Files
//
// A pipeline file names an input, an output and an ordered list of modules,
// each with a parameter mapping. Files are YAML (.yaml/.yml) or JSON (.json);
// any other extension is read as YAML.
//
// KEY COMPONENTS:
// - PipelineSpec: input/output paths plus the ordered module list
// - ModuleSpec: one module entry (name + params)
// - PipelineSpec::from_file / from_yaml_str / from_json_str: loaders
// - PipelineSpec::validate: structural checks shared by all loaders

use super::params::ModuleParams;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One entry of a pipeline's module list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSpec {
    /// Module name, optionally namespaced (`utility.cut`).
    pub name: String,

    #[serde(default, skip_serializing_if = "ModuleParams::is_empty")]
    pub params: ModuleParams,
}

impl ModuleSpec {
    pub fn new(name: impl Into<String>, params: ModuleParams) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }
}

/// Declarative description of a pipeline run.
///
/// `input` and `output` may be left out of the file when the caller supplies
/// them at run time; [`PipelineSpec::resolve_paths`] reports a configuration
/// error if neither source provides them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    pub modules: Vec<ModuleSpec>,
}

impl PipelineSpec {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, modules: Vec<ModuleSpec>) -> Self {
        Self {
            input: Some(input.into()),
            output: Some(output.into()),
            modules,
        }
    }

    /// Loads and validates a pipeline file.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        log::debug!("Loading pipeline configuration from {}", path.display());
        let contents = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            serde_json::from_str::<Self>(&contents).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<Self>(&contents).map_err(|e| e.to_string())
        };

        let spec = parsed.map_err(|message| CoreError::ConfigParse {
            path: path.to_path_buf(),
            message,
        })?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn from_yaml_str(contents: &str) -> CoreResult<Self> {
        let spec: Self = serde_yaml::from_str(contents).map_err(|e| CoreError::ConfigParse {
            path: PathBuf::from("<yaml>"),
            message: e.to_string(),
        })?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn from_json_str(contents: &str) -> CoreResult<Self> {
        let spec: Self = serde_json::from_str(contents).map_err(|e| CoreError::ConfigParse {
            path: PathBuf::from("<json>"),
            message: e.to_string(),
        })?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn to_yaml_string(&self) -> CoreResult<String> {
        serde_yaml::to_string(self).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Structural checks: at least one module, every module named.
    pub fn validate(&self) -> CoreResult<()> {
        if self.modules.is_empty() {
            return Err(CoreError::Config(
                "pipeline must declare at least one module".to_string(),
            ));
        }
        if let Some(index) = self.modules.iter().position(|m| m.name.trim().is_empty()) {
            return Err(CoreError::Config(format!(
                "module #{} has an empty name",
                index + 1
            )));
        }
        Ok(())
    }

    /// Combines the file's paths with run-time overrides. Overrides win.
    pub fn resolve_paths(
        &self,
        input_override: Option<&Path>,
        output_override: Option<&Path>,
    ) -> CoreResult<(PathBuf, PathBuf)> {
        let input = input_override
            .map(Path::to_path_buf)
            .or_else(|| self.input.clone())
            .ok_or_else(|| CoreError::Config("no input path configured".to_string()))?;
        let output = output_override
            .map(Path::to_path_buf)
            .or_else(|| self.output.clone())
            .ok_or_else(|| CoreError::Config("no output path configured".to_string()))?;
        Ok((input, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Write;

    const YAML: &str = r#"
input: in.mp4
output: out/result.mp4
modules:
  - name: resize
    params:
      width: 640
      height: 360
  - name: utility.cut
    params:
      duration: 10
  - name: deleteaudio
"#;

    #[test]
    fn parses_yaml_pipeline() {
        let spec = PipelineSpec::from_yaml_str(YAML).unwrap();
        assert_eq!(spec.input.as_deref(), Some(Path::new("in.mp4")));
        assert_eq!(spec.modules.len(), 3);
        assert_eq!(spec.modules[1].name, "utility.cut");
        assert!(spec.modules[2].params.is_empty());
        assert_eq!(
            spec.modules[0].params.reader("resize").dimension("width").unwrap(),
            Some(640)
        );
    }

    #[test]
    fn parses_json_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"input":"a.mp4","output":"b.mp4","modules":[{{"name":"crop","params":{{"position":"center"}}}}]}}"#
        )
        .unwrap();

        let spec = PipelineSpec::from_file(&path).unwrap();
        assert_eq!(spec.modules[0].name, "crop");
    }

    #[test]
    fn empty_module_list_is_a_config_error() {
        let err = PipelineSpec::from_yaml_str("input: a\noutput: b\nmodules: []\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn empty_module_name_is_a_config_error() {
        let err = PipelineSpec::from_yaml_str("modules:\n  - name: ''\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("#1"));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = PipelineSpec::from_file(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn overrides_take_precedence() {
        let spec = PipelineSpec::from_yaml_str(YAML).unwrap();
        let (input, output) = spec
            .resolve_paths(Some(Path::new("other.mp4")), None)
            .unwrap();
        assert_eq!(input, PathBuf::from("other.mp4"));
        assert_eq!(output, PathBuf::from("out/result.mp4"));

        let bare = PipelineSpec::from_yaml_str("modules:\n  - name: crop\n").unwrap();
        assert!(bare.resolve_paths(None, None).is_err());
    }
}
