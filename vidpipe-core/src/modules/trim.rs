//! Trim: keep a single time fragment of the video.
//!
//! The default stream-copy mode is fast but cuts on keyframes. With
//! `accurate: true` the input is seeked before decoding and re-encoded so
//! the fragment starts exactly at `start`.

use super::{StageContext, TransformModule};
use crate::config::{DEFAULT_PRESET, DEFAULT_VIDEO_CODEC, ModuleParams};
use crate::error::{CoreResult, validation_error};
use crate::external::{AudioCodec, FfmpegInvocation};
use crate::graph::fmt_num;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct Trim {
    start: f64,
    duration: f64,
    accurate: bool,
}

impl Trim {
    pub const NAME: &'static str = "cut_video";

    pub fn from_params(params: &ModuleParams) -> CoreResult<Self> {
        let r = params.reader(Self::NAME);
        let start = r.f64_or("start", 0.0)?;
        let duration = r.f64_or("duration", 10.0)?;
        if start < 0.0 {
            return Err(validation_error(Self::NAME, "'start' must not be negative"));
        }
        if duration <= 0.0 {
            return Err(validation_error(Self::NAME, "'duration' must be greater than zero"));
        }
        Ok(Self {
            start,
            duration,
            accurate: r.bool_or("accurate", false)?,
        })
    }

    fn invocation(&self, input: &Path, output: &Path) -> FfmpegInvocation {
        let start = fmt_num(self.start);
        let duration = fmt_num(self.duration);
        if self.accurate {
            FfmpegInvocation::new(output)
                .input_with(&["-ss", start.as_str()], input)
                .args(&["-t", duration.as_str(), "-c:v", DEFAULT_VIDEO_CODEC, "-preset", DEFAULT_PRESET])
                .audio(AudioCodec::Aac(128))
        } else {
            FfmpegInvocation::new(output)
                .input(input)
                .args(&["-ss", start.as_str(), "-t", duration.as_str(), "-c", "copy"])
        }
    }
}

impl TransformModule for Trim {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, ctx: &StageContext<'_>, input: &Path, output: &Path) -> CoreResult<()> {
        log::info!(
            "{} Trimming from {}s, duration {}s{}",
            ctx.tag(),
            self.start,
            self.duration,
            if self.accurate { " (accurate)" } else { "" }
        );
        ctx.run(&self.invocation(input, output))
    }
}
