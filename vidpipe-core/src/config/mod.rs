//! Configuration structures and constants for the vidpipe-core library.
//!
//! Two kinds of configuration live here: the declarative [`PipelineSpec`]
//! loaded from a YAML or JSON file, and the run-time [`PipelineSettings`]
//! supplied by the caller (temp directory placement, cleanup behaviour).

mod builder;
pub mod params;
pub mod pipeline_spec;
pub mod sample;

use std::path::PathBuf;

pub use builder::PipelineSettingsBuilder;
pub use params::{ModuleParams, ParamReader};
pub use pipeline_spec::{ModuleSpec, PipelineSpec};
pub use sample::sample_pipeline;

// Default constants

/// Video encoder used by every module that re-encodes video.
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";

/// x264 preset used by every module that re-encodes video.
pub const DEFAULT_PRESET: &str = "fast";

/// Encoder thread count passed to ffmpeg.
pub const DEFAULT_THREADS: u32 = 8;

/// Bitrate for modules that transcode audio to Opus.
pub const DEFAULT_OPUS_BITRATE: &str = "128k";

/// Default extension for intermediate stage files when the output has none.
pub const DEFAULT_STAGE_EXTENSION: &str = "mp4";

/// Run-time settings for one pipeline execution.
///
/// # Examples
///
/// ```rust
/// use vidpipe_core::config::PipelineSettingsBuilder;
/// use std::path::PathBuf;
///
/// let settings = PipelineSettingsBuilder::new()
///     .temp_dir(PathBuf::from("/tmp/vidpipe"))
///     .keep_temp(true)
///     .build();
/// assert!(settings.keep_temp);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PipelineSettings {
    /// Directory under which the private run directory is created
    /// (defaults to the output file's directory)
    pub temp_dir: Option<PathBuf>,

    /// Leave intermediate stage files on disk after a successful run
    pub keep_temp: bool,
}
