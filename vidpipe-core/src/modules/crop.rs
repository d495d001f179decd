//! Crop: cut a fixed-size window out of the frame.
//!
//! The window is placed either at absolute `x`/`y` coordinates
//! (`position: none`, the default) or at a named position relative to the
//! input frame.

use super::{StageContext, TransformModule};
use crate::config::ModuleParams;
use crate::error::{CoreResult, validation_error};
use crate::external::{AudioCodec, FfmpegInvocation};
use crate::geometry::{Axes, Position};
use crate::graph::{Filter, FilterGraph};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct Crop {
    width: u32,
    height: u32,
    x: i64,
    y: i64,
    position: Option<Position>,
}

impl Crop {
    pub const NAME: &'static str = "crop";

    pub fn from_params(params: &ModuleParams) -> CoreResult<Self> {
        let r = params.reader(Self::NAME);
        let x = r.i64_or("x", 0)?;
        let y = r.i64_or("y", 0)?;
        if x < 0 || y < 0 {
            return Err(validation_error(Self::NAME, "'x' and 'y' must not be negative"));
        }

        let position = match r.string("position")? {
            None => None,
            Some(p) if p.trim().eq_ignore_ascii_case("none") => None,
            Some(p) => match p.parse::<Position>() {
                Ok(position) => Some(position),
                Err(_) => {
                    log::warn!("crop: unknown position '{}', using absolute coordinates", p);
                    None
                }
            },
        };

        Ok(Self {
            width: r.dimension_or("width", 1280)?,
            height: r.dimension_or("height", 720)?,
            x,
            y,
            position,
        })
    }

    /// `crop=W:H:X:Y` with X/Y either literal or relative to `in_w`/`in_h`.
    pub fn filter(&self) -> Filter {
        let offsets = match self.position {
            None => format!("{}:{}", self.x, self.y),
            Some(position) => Axes::crop(self.width, self.height)
                .resolve(position)
                .positional(),
        };
        Filter::new("crop", format!("{}:{}:{}", self.width, self.height, offsets))
    }
}

impl TransformModule for Crop {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, ctx: &StageContext<'_>, input: &Path, output: &Path) -> CoreResult<()> {
        let graph = FilterGraph::single(vec![self.filter()]);
        let invocation = FfmpegInvocation::new(output)
            .input(input)
            .filter_graph(&graph)
            .map("0:a?")
            .default_video_codec()
            .audio(AudioCodec::Copy);
        ctx.run(&invocation)?;
        log::info!("{} Cropped {} -> {}", ctx.tag(), input.display(), output.display());
        Ok(())
    }

    fn filter_graph(&self) -> Option<FilterGraph> {
        Some(FilterGraph::single(vec![self.filter()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::test_support::{arg_after, context, single_call};
    use crate::external::mocks::{MockFfmpegSpawner, MockMediaProber};

    fn crop(params: ModuleParams) -> Crop {
        Crop::from_params(&params).unwrap()
    }

    #[test]
    fn absolute_crop_uses_defaults() {
        let c = crop(ModuleParams::new().with("x", 10).with("y", 20));
        assert_eq!(c.filter().to_string(), "crop=1280:720:10:20");
    }

    #[test]
    fn named_positions_are_relative_to_input() {
        let c = crop(ModuleParams::new().with("width", 640).with("height", 360).with("position", "bottomright"));
        assert_eq!(c.filter().to_string(), "crop=640:360:in_w-640:in_h-360");

        let c = crop(ModuleParams::new().with("width", 640).with("height", 360).with("position", "center"));
        assert_eq!(c.filter().to_string(), "crop=640:360:(in_w-640)/2:(in_h-360)/2");

        let c = crop(ModuleParams::new().with("width", 640).with("height", 360).with("position", "topright"));
        assert_eq!(c.filter().to_string(), "crop=640:360:in_w-640:0");
    }

    #[test]
    fn unknown_position_falls_back_to_coordinates() {
        let c = crop(ModuleParams::new().with("position", "diagonal").with("x", 5));
        assert_eq!(c.filter().to_string(), "crop=1280:720:5:0");
    }

    #[test]
    fn negative_offsets_are_rejected() {
        assert!(Crop::from_params(&ModuleParams::new().with("x", -1)).is_err());
    }

    #[test]
    fn process_runs_ffmpeg_with_graph() {
        let spawner = MockFfmpegSpawner::succeeding();
        let prober = MockMediaProber::new();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.mp4");
        let c = crop(ModuleParams::new().with("position", "topleft"));

        c.process(&context(&spawner, &prober), Path::new("in.mp4"), &out)
            .unwrap();

        let args = single_call(&spawner);
        assert_eq!(arg_after(&args, "-filter_complex"), Some("[0:v]crop=1280:720:0:0[out]"));
        assert_eq!(arg_after(&args, "-c:a"), Some("copy"));
        assert_eq!(args.last().map(String::as_str), out.to_str());
        assert!(out.exists());
    }
}
