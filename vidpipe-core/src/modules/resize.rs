//! Resize: scale the video to a target size.
//!
//! With `keep_aspect_ratio` (the default) the video is fitted inside the
//! target and letterboxed; otherwise it is stretched.

use super::{StageContext, TransformModule};
use crate::config::ModuleParams;
use crate::error::{CoreResult, validation_error};
use crate::external::{AudioCodec, FfmpegInvocation};
use crate::graph::{Filter, FilterGraph};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct Resize {
    width: u32,
    height: u32,
    keep_aspect_ratio: bool,
    audio_codec: AudioCodec,
}

/// Parses the shared `audio_codec` parameter (`copy` or `libopus`).
pub(crate) fn audio_codec_param(params: &ModuleParams, module: &str) -> CoreResult<AudioCodec> {
    let name = params.reader(module).string_or("audio_codec", "copy")?;
    AudioCodec::from_name(&name)
        .ok_or_else(|| validation_error(module, format!("unsupported audio_codec '{name}'")))
}

impl Resize {
    pub const NAME: &'static str = "resize";

    pub fn from_params(params: &ModuleParams) -> CoreResult<Self> {
        let r = params.reader(Self::NAME);
        Ok(Self {
            width: r.dimension_or("width", 1280)?,
            height: r.dimension_or("height", 720)?,
            keep_aspect_ratio: r.bool_or("keep_aspect_ratio", true)?,
            audio_codec: audio_codec_param(params, Self::NAME)?,
        })
    }

    pub fn filters(&self) -> Vec<Filter> {
        let (w, h) = (self.width, self.height);
        if self.keep_aspect_ratio {
            vec![
                Filter::new("scale", format!("{w}:{h}:force_original_aspect_ratio=decrease")),
                Filter::new("pad", format!("{w}:{h}:(ow-iw)/2:(oh-ih)/2")),
            ]
        } else {
            vec![Filter::new("scale", format!("{w}:{h}"))]
        }
    }
}

impl TransformModule for Resize {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, ctx: &StageContext<'_>, input: &Path, output: &Path) -> CoreResult<()> {
        let invocation = FfmpegInvocation::new(output)
            .input(input)
            .filter_graph(&FilterGraph::single(self.filters()))
            .map("0:a?")
            .default_video_codec()
            .audio(self.audio_codec);
        ctx.run(&invocation)?;
        log::info!(
            "{} Resized to {}x{}: {} -> {}",
            ctx.tag(),
            self.width,
            self.height,
            input.display(),
            output.display()
        );
        Ok(())
    }

    fn filter_graph(&self) -> Option<FilterGraph> {
        Some(FilterGraph::single(self.filters()))
    }
}
