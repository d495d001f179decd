//! Chromakey: key out a background color from a second video and composite
//! the remainder over the main video.
//!
//! `color`, `similarity` and `blend` accept either single values or lists;
//! with lists, one key step is applied per color, each using the tolerance
//! at the same index (or the last one given).

use super::overlay::{OverlaySize, alpha_filters, key_color, overlay_filter, read_alpha, read_time_window};
use super::{StageContext, TransformModule, require_asset};
use crate::config::{ModuleParams, ParamReader};
use crate::error::{CoreResult, validation_error};
use crate::external::{AudioCodec, FfmpegInvocation};
use crate::geometry::{Axes, Placement, Position, place};
use crate::graph::{Filter, FilterGraph, Pad, TimeWindow, fmt_num};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
struct KeyStep {
    color: String,
    similarity: f64,
    blend: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chromakey {
    overlay: PathBuf,
    keys: Vec<KeyStep>,
    yuv: bool,
    placement: Placement,
    size: OverlaySize,
    alpha: f64,
    window: TimeWindow,
    mute_overlay: bool,
}

fn tolerances(r: &ParamReader<'_>, key: &str, default: f64) -> CoreResult<Vec<f64>> {
    let values = r.f64_list(key)?.unwrap_or_else(|| vec![default]);
    if values.is_empty() {
        return Ok(vec![default]);
    }
    if let Some(bad) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
        return Err(validation_error(
            r.module(),
            format!("'{key}' values must be between 0 and 1, got {bad}"),
        ));
    }
    Ok(values)
}

impl Chromakey {
    pub const NAME: &'static str = "chromakey";

    pub fn from_params(params: &ModuleParams) -> CoreResult<Self> {
        let r = params.reader(Self::NAME);
        let overlay = require_asset(Self::NAME, r.require_path("overlay")?)?;

        let colors = r
            .string_list("color")?
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| vec!["green".to_string()]);
        let similarities = tolerances(&r, "similarity", 0.1)?;
        let blends = tolerances(&r, "blend", 0.0)?;

        let pick = |values: &[f64], i: usize| values.get(i).or(values.last()).copied().unwrap_or_default();
        let keys = colors
            .iter()
            .enumerate()
            .map(|(i, color)| KeyStep {
                color: key_color(color),
                similarity: pick(&similarities, i),
                blend: pick(&blends, i),
            })
            .collect();

        let position = Position::from_param(r.string("position")?, Position::Center, Self::NAME);
        Ok(Self {
            overlay,
            keys,
            yuv: r.bool_or("yuv", false)?,
            placement: place(Self::NAME, &Axes::overlay(), position, r.i64("x")?, r.i64("y")?)?,
            size: OverlaySize::from_reader(&r, 1.0)?,
            alpha: read_alpha(&r, "alpha", 1.0)?,
            window: read_time_window(&r, None)?,
            mute_overlay: r.bool_or("mute_overlay", true)?,
        })
    }

    fn build_graph(&self) -> FilterGraph {
        let mut graph = FilterGraph::new();
        let filter_name = if self.yuv { "chromakey" } else { "colorkey" };
        let keys = self
            .keys
            .iter()
            .map(|k| {
                Filter::new(
                    filter_name,
                    format!("{}:{}:{}", k.color, fmt_num(k.similarity), fmt_num(k.blend)),
                )
            })
            .collect();
        let mut layer = graph.chain(vec![Pad::video(1)], keys, "ckout");

        let mut post = Vec::new();
        post.extend(self.size.filter());
        post.extend(alpha_filters(self.alpha));
        if !post.is_empty() {
            layer = graph.chain(vec![layer], post, "scaled");
        }

        graph.finish(
            vec![Pad::video(0), layer],
            vec![overlay_filter(&self.placement, &self.window)],
        );
        graph
    }
}

impl TransformModule for Chromakey {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, ctx: &StageContext<'_>, input: &Path, output: &Path) -> CoreResult<()> {
        let mut invocation = FfmpegInvocation::new(output)
            .input(input)
            .input(&self.overlay)
            .filter_graph(&self.build_graph())
            .map("0:a?");
        if !self.mute_overlay {
            invocation = invocation.map("1:a?");
        }
        let invocation = invocation.default_video_codec().audio(AudioCodec::Copy);

        ctx.run(&invocation)?;
        log::info!(
            "{} Keyed {} over {} -> {}",
            ctx.tag(),
            self.overlay.display(),
            input.display(),
            output.display()
        );
        Ok(())
    }

    fn filter_graph(&self) -> Option<FilterGraph> {
        Some(self.build_graph())
    }
}
