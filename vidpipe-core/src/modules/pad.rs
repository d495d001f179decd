//! Pad: place the video on a larger canvas.
//!
//! The canvas is either a solid color (`pad` filter) or a background image
//! scaled to the canvas size, with the video overlaid on top.

use super::{StageContext, TransformModule, require_asset};
use crate::config::ModuleParams;
use crate::error::CoreResult;
use crate::external::{AudioCodec, FfmpegInvocation};
use crate::geometry::{Axes, Position};
use crate::graph::{Filter, FilterGraph, Pad as GraphPad};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct Pad {
    width: u32,
    height: u32,
    position: Position,
    color: String,
    image_path: Option<PathBuf>,
}

impl Pad {
    pub const NAME: &'static str = "pad";

    pub fn from_params(params: &ModuleParams) -> CoreResult<Self> {
        let r = params.reader(Self::NAME);
        let image_path = r
            .path("image_path")?
            .map(|p| require_asset(Self::NAME, p))
            .transpose()?;

        Ok(Self {
            width: r.dimension_or("width", 1920)?,
            height: r.dimension_or("height", 1080)?,
            position: Position::from_param(r.string("position")?, Position::Center, Self::NAME),
            color: r.string_or("color", "black")?,
            image_path,
        })
    }

    fn build_graph(&self) -> FilterGraph {
        match &self.image_path {
            None => {
                let placement = Axes::pad().resolve(self.position);
                FilterGraph::single(vec![Filter::new(
                    "pad",
                    format!(
                        "{}:{}:{}:{}",
                        self.width,
                        self.height,
                        placement.positional(),
                        self.color
                    ),
                )])
            }
            Some(_) => {
                let mut graph = FilterGraph::new();
                let bg = graph.chain(
                    vec![GraphPad::video(1)],
                    vec![
                        Filter::new("scale", format!("{}:{}", self.width, self.height)),
                        Filter::new("setsar", "1"),
                    ],
                    "bg",
                );
                let placement = Axes::overlay().resolve(self.position);
                graph.finish(
                    vec![bg, GraphPad::video(0)],
                    vec![Filter::new(
                        "overlay",
                        format!("{}:shortest=1", placement.positional()),
                    )],
                );
                graph
            }
        }
    }
}

impl TransformModule for Pad {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, ctx: &StageContext<'_>, input: &Path, output: &Path) -> CoreResult<()> {
        let mut invocation = FfmpegInvocation::new(output).input(input);
        if let Some(image) = &self.image_path {
            // A still image is a single frame; loop it so it lasts as long as the video.
            invocation = invocation.input_with(&["-loop", "1"], image);
        }
        let invocation = invocation
            .filter_graph(&self.build_graph())
            .map("0:a?")
            .default_video_codec()
            .audio(AudioCodec::Copy);

        ctx.run(&invocation)?;
        log::info!(
            "{} Padded to {}x{} ({}): {} -> {}",
            ctx.tag(),
            self.width,
            self.height,
            if self.image_path.is_some() { "image" } else { self.color.as_str() },
            input.display(),
            output.display()
        );
        Ok(())
    }

    fn filter_graph(&self) -> Option<FilterGraph> {
        Some(self.build_graph())
    }
}
