//! Watermark: composite a (usually translucent) image over the video.

use super::overlay::{OverlaySize, alpha_filters, overlay_filter, read_alpha, read_time_window};
use super::resize::audio_codec_param;
use super::{StageContext, TransformModule, require_asset};
use crate::config::ModuleParams;
use crate::error::CoreResult;
use crate::external::{AudioCodec, FfmpegInvocation};
use crate::geometry::{Axes, Placement, Position, place};
use crate::graph::{FilterGraph, Pad, TimeWindow};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct Watermark {
    image_path: PathBuf,
    placement: Placement,
    opacity: f64,
    size: OverlaySize,
    window: TimeWindow,
    audio_codec: AudioCodec,
}

impl Watermark {
    pub const NAME: &'static str = "watermark";

    pub fn from_params(params: &ModuleParams) -> CoreResult<Self> {
        let r = params.reader(Self::NAME);
        let image_path = require_asset(Self::NAME, r.require_path("image_path")?)?;
        let size = OverlaySize::from_reader(&r, 0.2)?;

        Ok(Self {
            image_path,
            placement: place(
                Self::NAME,
                &Axes::watermark(),
                Position::from_param(r.string("position")?, Position::BottomRight, Self::NAME),
                r.i64("x")?,
                r.i64("y")?,
            )?,
            opacity: read_alpha(&r, "opacity", 0.5)?,
            size,
            window: read_time_window(&r, None)?,
            audio_codec: audio_codec_param(params, Self::NAME)?,
        })
    }

    fn build_graph(&self) -> FilterGraph {
        let mut graph = FilterGraph::new();
        let mut filters = vec![self.size.width_relative_filter()];
        filters.extend(alpha_filters(self.opacity));
        let mark = graph.chain(vec![Pad::video(1)], filters, "watermark");

        graph.finish(
            vec![Pad::video(0), mark],
            vec![overlay_filter(&self.placement, &self.window)],
        );
        graph
    }
}

impl TransformModule for Watermark {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, ctx: &StageContext<'_>, input: &Path, output: &Path) -> CoreResult<()> {
        let invocation = FfmpegInvocation::new(output)
            .input(input)
            .input(&self.image_path)
            .filter_graph(&self.build_graph())
            .map("0:a?")
            .default_video_codec()
            .audio(self.audio_codec)
            .arg("-shortest");
        ctx.run(&invocation)?;
        log::info!(
            "{} Watermark {} added: {} -> {}",
            ctx.tag(),
            self.image_path.display(),
            input.display(),
            output.display()
        );
        Ok(())
    }

    fn filter_graph(&self) -> Option<FilterGraph> {
        Some(self.build_graph())
    }
}
