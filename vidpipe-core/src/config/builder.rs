// ============================================================================
// vidpipe-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for PipelineSettings
//
// KEY COMPONENTS:
// - PipelineSettingsBuilder: fluent construction of PipelineSettings

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::PipelineSettings;

/// Builder for creating [`PipelineSettings`] instances.
#[derive(Debug, Clone, Default)]
pub struct PipelineSettingsBuilder {
    temp_dir: Option<PathBuf>,
    keep_temp: bool,
}

impl PipelineSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory in which per-run staging directories are created.
    #[must_use]
    pub fn temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.temp_dir = Some(temp_dir);
        self
    }

    /// Keeps intermediate stage files after a successful run.
    #[must_use]
    pub fn keep_temp(mut self, keep_temp: bool) -> Self {
        self.keep_temp = keep_temp;
        self
    }

    pub fn build(self) -> PipelineSettings {
        PipelineSettings {
            temp_dir: self.temp_dir,
            keep_temp: self.keep_temp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_temp_dir_unset() {
        let settings = PipelineSettingsBuilder::new().build();
        assert!(settings.temp_dir.is_none());
        assert!(!settings.keep_temp);
    }

    #[test]
    fn builder_sets_fields() {
        let settings = PipelineSettingsBuilder::new()
            .temp_dir(PathBuf::from("/scratch"))
            .keep_temp(true)
            .build();
        assert_eq!(settings.temp_dir, Some(PathBuf::from("/scratch")));
        assert!(settings.keep_temp);
    }
}
