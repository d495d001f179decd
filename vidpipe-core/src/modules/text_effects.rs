//! Text effects: animated captions drawn with `drawtext`.
//!
//! The text is drawn onto a transparent copy of the frame so that effects
//! (shake, wave, rotate, fade, glow) act on the text alone before it is
//! composited back over the untouched video.

use super::{StageContext, TransformModule, require_asset};
use crate::config::ModuleParams;
use crate::error::{CoreResult, validation_error};
use crate::external::{AudioCodec, FfmpegInvocation};
use crate::geometry::{Axes, Placement, Position, place};
use crate::graph::{Filter, FilterGraph, Pad, TimeWindow, fmt_num};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Font used when the pipeline does not name one.
pub const DEFAULT_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";

/// Length of each fade ramp, in seconds.
const FADE_SECONDS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Effect {
    #[default]
    Shake,
    Wave,
    Rotate,
    Fade,
    Glow,
    None,
}

impl Effect {
    pub const ALL: [Effect; 6] = [
        Effect::Shake,
        Effect::Wave,
        Effect::Rotate,
        Effect::Fade,
        Effect::Glow,
        Effect::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Effect::Shake => "shake",
            Effect::Wave => "wave",
            Effect::Rotate => "rotate",
            Effect::Fade => "fade",
            Effect::Glow => "glow",
            Effect::None => "none",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Effect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Effect::ALL
            .into_iter()
            .find(|e| e.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Effect::ALL.iter().map(|e| e.as_str()).collect();
                format!("unknown effect '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// Escapes a value for use inside a single-quoted filter argument.
fn escape_quoted(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "'\\\\\\''")
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextEffects {
    text: String,
    font: Option<PathBuf>,
    font_size: u32,
    color: String,
    outline_color: String,
    outline_width: u32,
    placement: Placement,
    effect: Effect,
    /// `effect_intensity`, 1 to 10.
    level: u32,
    start: f64,
    duration: Option<f64>,
}

impl TextEffects {
    pub const NAME: &'static str = "text_effects";

    pub fn from_params(params: &ModuleParams) -> CoreResult<Self> {
        let r = params.reader(Self::NAME);

        let font = match r.path("font")? {
            Some(path) => Some(require_asset(Self::NAME, path)?),
            None if Path::new(DEFAULT_FONT).exists() => Some(PathBuf::from(DEFAULT_FONT)),
            None => {
                log::warn!(
                    "{}: default font {} not found, using ffmpeg's built-in font",
                    Self::NAME,
                    DEFAULT_FONT
                );
                None
            }
        };

        let effect = match r.string("effect")? {
            Some(name) => name
                .parse::<Effect>()
                .map_err(|e| validation_error(Self::NAME, e))?,
            None => Effect::default(),
        };

        let level = r.i64_or("effect_intensity", 5)?;
        if !(1..=10).contains(&level) {
            return Err(validation_error(
                Self::NAME,
                format!("'effect_intensity' must be between 1 and 10, got {level}"),
            ));
        }

        let start = r.f64_or("start_time", 0.0)?;
        let duration = r.f64("duration")?;
        if start < 0.0 || duration.is_some_and(|d| d <= 0.0) {
            return Err(validation_error(
                Self::NAME,
                "'start_time' must not be negative and 'duration' must be positive",
            ));
        }
        if effect == Effect::Fade && duration.is_none() {
            return Err(validation_error(Self::NAME, "the fade effect requires 'duration'"));
        }

        let position = Position::from_param(r.string("position")?, Position::Center, Self::NAME);
        Ok(Self {
            text: r.string_or("text", "Sample Text")?,
            font,
            font_size: r.dimension_or("font_size", 72)?,
            color: r.string_or("color", "white")?,
            outline_color: r.string_or("outline_color", "black")?,
            outline_width: r.i64_or("outline_width", 2)?.max(0) as u32,
            placement: place(Self::NAME, &Axes::drawtext(), position, r.i64("x")?, r.i64("y")?)?,
            effect,
            level: level as u32,
            start,
            duration,
        })
    }

    fn window(&self) -> TimeWindow {
        TimeWindow::new(Some(self.start), None, self.duration)
    }

    fn drawtext(&self) -> Filter {
        let mut args = String::new();
        if let Some(font) = &self.font {
            args.push_str(&format!("fontfile='{}':", escape_quoted(&font.to_string_lossy())));
        }
        args.push_str(&format!(
            "text='{}':expansion=none:fontsize={}:fontcolor={}:{}:bordercolor={}:borderw={}{}",
            escape_quoted(&self.text),
            self.font_size,
            self.color,
            self.placement.named(),
            self.outline_color,
            self.outline_width,
            self.window().enable_suffix(),
        ));
        Filter::new("drawtext", args)
    }

    /// Filters applied to the text layer after drawing.
    fn layer_filters(&self) -> Vec<Filter> {
        let level = self.level;
        match self.effect {
            Effect::Wave => {
                let offset = format!(
                    "Y+{}*sin(2*PI*{}*X/W+T)",
                    2 * level,
                    fmt_num(f64::from(level) / 5.0)
                );
                vec![Filter::new(
                    "geq",
                    format!("r='r(X,{offset})':g='g(X,{offset})':b='b(X,{offset})':a='alpha(X,{offset})'"),
                )]
            }
            // angle in radians, 3 rad/s per intensity step
            Effect::Rotate => vec![Filter::new("rotate", format!("a='t*{}':c=none", 3 * level))],
            Effect::Fade => {
                let duration = self.duration.unwrap_or(FADE_SECONDS);
                // never before the text appears, even when shown for under a second
                let out_start = (self.start + duration - FADE_SECONDS).max(self.start);
                vec![
                    Filter::new(
                        "fade",
                        format!("t=in:st={}:d={}:alpha=1", fmt_num(self.start), fmt_num(FADE_SECONDS)),
                    ),
                    Filter::new(
                        "fade",
                        format!("t=out:st={}:d={}:alpha=1", fmt_num(out_start), fmt_num(FADE_SECONDS)),
                    ),
                ]
            }
            Effect::Shake | Effect::Glow | Effect::None => Vec::new(),
        }
    }

    /// Position of the text layer in the final composite.
    fn composite_position(&self) -> String {
        match self.effect {
            Effect::Shake => {
                let amplitude = 5 * self.level / 10;
                let freq = self.level;
                format!("x='{amplitude}*sin(t*{freq})':y='{amplitude}*cos(t*{freq})'")
            }
            _ => "0:0".to_string(),
        }
    }

    fn build_graph(&self) -> FilterGraph {
        let mut graph = FilterGraph::new();
        let mut pads = graph.fork(vec![Pad::video(0)], vec![Filter::bare("split")], &["base", "canvas"]);
        let canvas = pads.pop().unwrap_or_else(|| Pad::Label("canvas".to_string()));
        let base = pads.pop().unwrap_or_else(|| Pad::video(0));

        let mut filters = vec![
            Filter::new("format", "rgba"),
            Filter::new("colorchannelmixer", "aa=0"),
            self.drawtext(),
        ];
        filters.extend(self.layer_filters());
        let mut text = graph.chain(vec![canvas], filters, "text");

        if self.effect == Effect::Glow {
            let mut layers = graph.fork(vec![text], vec![Filter::bare("split")], &["sharp", "soft"]);
            let soft = layers.pop().unwrap_or_else(|| Pad::Label("soft".to_string()));
            let sharp = layers.pop().unwrap_or_else(|| Pad::Label("sharp".to_string()));
            let sigma = 2 * self.level;
            let glow = graph.chain(
                vec![soft],
                vec![
                    Filter::new("gblur", format!("sigma={sigma}")),
                    Filter::new("colorbalance", "gh=1:bh=1"),
                ],
                "glow",
            );
            text = graph.chain(
                vec![glow, sharp],
                vec![Filter::new("overlay", "0:0:format=auto")],
                "text",
            );
        }

        graph.finish(
            vec![base, text],
            vec![Filter::new(
                "overlay",
                format!("{}:format=auto", self.composite_position()),
            )],
        );
        graph
    }
}

impl TransformModule for TextEffects {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, ctx: &StageContext<'_>, input: &Path, output: &Path) -> CoreResult<()> {
        let invocation = FfmpegInvocation::new(output)
            .input(input)
            .filter_graph(&self.build_graph())
            .map("0:a?")
            .default_video_codec()
            .audio(AudioCodec::Copy);

        ctx.run(&invocation)?;
        log::info!(
            "{} Added '{}' text ({} effect): {} -> {}",
            ctx.tag(),
            self.text,
            self.effect,
            input.display(),
            output.display()
        );
        Ok(())
    }

    fn filter_graph(&self) -> Option<FilterGraph> {
        Some(self.build_graph())
    }
}
