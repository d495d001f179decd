//! DeleteAudio: re-encode the video and drop every audio stream.

use super::{StageContext, TransformModule};
use crate::config::ModuleParams;
use crate::error::CoreResult;
use crate::external::{AudioCodec, FfmpegInvocation};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteAudio;

impl DeleteAudio {
    pub const NAME: &'static str = "deleteaudio";

    pub fn from_params(params: &ModuleParams) -> CoreResult<Self> {
        if !params.is_empty() {
            log::debug!("deleteaudio: ignoring parameters {:?}", params.keys().collect::<Vec<_>>());
        }
        Ok(Self)
    }
}

impl TransformModule for DeleteAudio {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, ctx: &StageContext<'_>, input: &Path, output: &Path) -> CoreResult<()> {
        let invocation = FfmpegInvocation::new(output)
            .input(input)
            .default_video_codec()
            .audio(AudioCodec::Disabled);
        ctx.run(&invocation)?;
        log::info!("{} Audio removed: {} -> {}", ctx.tag(), input.display(), output.display());
        Ok(())
    }
}
