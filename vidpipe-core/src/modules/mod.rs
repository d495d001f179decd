// ============================================================================
// vidpipe-core/src/modules/mod.rs
// ============================================================================
//
// TRANSFORM MODULES: The Units a Pipeline Is Built From
//
// Every pipeline stage is a TransformModule: an immutable value built from a
// module's parameter mapping, which turns one input file into one output file
// by running ffmpeg through the StageContext it is handed.
//
// KEY COMPONENTS:
// - TransformModule: the stage contract
// - StageContext: per-stage handles (spawner, prober) and log tagging
// - require_asset: construction-time existence check for auxiliary files
//
// Parameters are validated when a module is constructed, so a pipeline with
// a bad entry fails before any media is touched.

use crate::error::{CoreError, CoreResult};
use crate::external::{FfmpegInvocation, FfmpegSpawner, MediaProber, run_ffmpeg};
use crate::graph::FilterGraph;
use std::fmt;
use std::path::{Path, PathBuf};

pub mod add_video;
pub mod chromakey;
pub mod crop;
pub mod delete_audio;
pub mod overlay;
pub mod pad;
pub mod resize;
pub mod text_effects;
pub mod trim;
pub mod utility;
pub mod watermark;

pub use add_video::AddVideo;
pub use chromakey::Chromakey;
pub use crop::Crop;
pub use delete_audio::DeleteAudio;
pub use pad::Pad;
pub use resize::Resize;
pub use text_effects::TextEffects;
pub use trim::Trim;
pub use utility::{Cut, ModuleWrapper, PrepareForYt};
pub use watermark::Watermark;

/// Handles and identity of the stage being executed.
pub struct StageContext<'a> {
    pub spawner: &'a dyn FfmpegSpawner,
    pub prober: &'a dyn MediaProber,
    pub run_id: &'a str,
    /// Zero-based stage index.
    pub stage: usize,
    pub total: usize,
}

impl StageContext<'_> {
    /// Log prefix identifying the run and stage, e.g. `[a1b2c3 2/4]`.
    pub fn tag(&self) -> String {
        format!("[{} {}/{}]", self.run_id, self.stage + 1, self.total)
    }

    /// Runs one ffmpeg invocation on behalf of this stage.
    pub fn run(&self, invocation: &FfmpegInvocation) -> CoreResult<()> {
        log::debug!("{} ffmpeg -> {}", self.tag(), invocation.output().display());
        run_ffmpeg(self.spawner, invocation)
    }
}

/// A configured pipeline stage.
pub trait TransformModule: fmt::Debug {
    /// Registry key of the module kind.
    fn name(&self) -> &'static str;

    /// Transforms `input` into `output`.
    fn process(&self, ctx: &StageContext<'_>, input: &Path, output: &Path) -> CoreResult<()>;

    /// The filter graph this module runs, when it does not depend on the
    /// input file.
    fn filter_graph(&self) -> Option<FilterGraph> {
        None
    }
}

/// Checks that an auxiliary file referenced by a module exists.
pub(crate) fn require_asset(module: &str, path: PathBuf) -> CoreResult<PathBuf> {
    if path.exists() {
        Ok(path)
    } else {
        Err(CoreError::AssetNotFound {
            module: module.to_string(),
            path,
        })
    }
}

/// Copies `from` to `to` unless they are the same file.
pub(crate) fn copy_through(from: &Path, to: &Path) -> CoreResult<()> {
    if from == to {
        return Ok(());
    }
    if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(from, to)?;
    Ok(())
}
