//! AddVideo: picture-in-picture overlay of a second video.
//!
//! The overlay can be resized, made translucent, limited to a time window
//! and looped to cover the whole main video.

use super::overlay::{OverlaySize, alpha_filters, overlay_filter, read_alpha, read_time_window};
use super::resize::audio_codec_param;
use super::{StageContext, TransformModule, require_asset};
use crate::config::ModuleParams;
use crate::error::CoreResult;
use crate::external::{AudioCodec, FfmpegInvocation};
use crate::geometry::{Axes, Placement, Position, place};
use crate::graph::{Filter, FilterGraph, Pad, TimeWindow};
use std::path::{Path, PathBuf};

/// Number of times the overlay input is repeated so that it outlasts the
/// main video: `floor(main / overlay) + 2`.
///
/// Returns `None` when either duration is unknown, meaning "loop forever".
pub fn loop_count(main_duration: Option<f64>, overlay_duration: Option<f64>) -> Option<u64> {
    match (main_duration, overlay_duration) {
        (Some(main), Some(overlay)) if main > 0.0 && overlay > 0.0 => {
            Some((main / overlay).floor() as u64 + 2)
        }
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddVideo {
    video_path: PathBuf,
    placement: Placement,
    size: OverlaySize,
    alpha: f64,
    window: TimeWindow,
    looped: bool,
    mute: bool,
    audio_codec: AudioCodec,
}

impl AddVideo {
    pub const NAME: &'static str = "addvideo";

    pub fn from_params(params: &ModuleParams) -> CoreResult<Self> {
        let r = params.reader(Self::NAME);
        let video_path = require_asset(Self::NAME, r.require_path("video_path")?)?;
        let position = Position::from_param(r.string("position")?, Position::Center, Self::NAME);

        Ok(Self {
            video_path,
            placement: place(Self::NAME, &Axes::overlay(), position, r.i64("x")?, r.i64("y")?)?,
            size: OverlaySize::from_reader(&r, 1.0)?,
            alpha: read_alpha(&r, "alpha", 1.0)?,
            window: read_time_window(&r, None)?,
            looped: r.bool_or("loop", false)?,
            mute: r.bool_or("mute", false)?,
            audio_codec: audio_codec_param(params, Self::NAME)?,
        })
    }

    fn build_graph(&self) -> FilterGraph {
        let mut graph = FilterGraph::new();

        let scale = self.size.filter().unwrap_or_else(|| Filter::bare("null"));
        let scaled = graph.chain(vec![Pad::video(1)], vec![scale], "scaled");

        let mut alpha = alpha_filters(self.alpha);
        if alpha.is_empty() {
            alpha.push(Filter::bare("null"));
        }
        let overlay = graph.chain(vec![scaled], alpha, "overlay");

        graph.finish(
            vec![Pad::video(0), overlay],
            vec![overlay_filter(&self.placement, &self.window)],
        );
        graph
    }

    fn invocation(&self, ctx: &StageContext<'_>, input: &Path, output: &Path) -> FfmpegInvocation {
        let invocation = FfmpegInvocation::new(output).input(input);
        let invocation = if self.looped {
            let repeat = match loop_count(ctx.prober.duration(input), ctx.prober.duration(&self.video_path)) {
                Some(count) => {
                    log::info!("{} Looping overlay {} times", ctx.tag(), count);
                    count.to_string()
                }
                None => {
                    log::warn!(
                        "{} Could not determine durations, looping overlay indefinitely",
                        ctx.tag()
                    );
                    "-1".to_string()
                }
            };
            invocation.input_with(&["-stream_loop", repeat.as_str()], &self.video_path)
        } else {
            invocation.input(&self.video_path)
        };

        let mut invocation = invocation.filter_graph(&self.build_graph()).map("0:a?");
        if !self.mute {
            invocation = invocation.map("1:a?");
        }
        invocation
            .default_video_codec()
            .audio(self.audio_codec)
            .arg("-shortest")
    }
}

impl TransformModule for AddVideo {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, ctx: &StageContext<'_>, input: &Path, output: &Path) -> CoreResult<()> {
        ctx.run(&self.invocation(ctx, input, output))?;
        log::info!(
            "{} Overlay {} added: {} -> {}",
            ctx.tag(),
            self.video_path.display(),
            input.display(),
            output.display()
        );
        Ok(())
    }

    fn filter_graph(&self) -> Option<FilterGraph> {
        Some(self.build_graph())
    }
}
