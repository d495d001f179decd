//! Splits the stage input into consecutive fixed-length parts written to a
//! side directory (`output_dir`, relative to the working directory unless
//! absolute). The pipeline itself continues with the unchanged input.

use crate::config::ModuleParams;
use crate::error::{CoreResult, validation_error};
use crate::external::{AudioCodec, FfmpegInvocation};
use crate::graph::fmt_num;
use crate::modules::{StageContext, TransformModule, copy_through};
use std::path::{Path, PathBuf};

/// Start offsets of the segments covering `total` seconds in `segment`-second
/// steps, rounded to the microsecond. Every part is requested at the full
/// segment length; ffmpeg stops the last one at the end of the input.
pub fn segment_plan(total: f64, segment: f64) -> Vec<f64> {
    if total <= 0.0 || segment <= 0.0 {
        return Vec::new();
    }
    // 0.9 / 0.3 is 3.0000000000000004 in f64
    let count = (total / segment - 1e-9).ceil().max(1.0) as usize;
    (0..count)
        .map(|i| (i as f64 * segment * 1e6).round() / 1e6)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cut {
    duration: f64,
    output_dir: PathBuf,
    prefix: String,
    use_input_name: bool,
}

impl Cut {
    pub const NAME: &'static str = "utility.cut";

    pub fn from_params(params: &ModuleParams) -> CoreResult<Self> {
        let r = params.reader(Self::NAME);
        let duration = r.require_f64("duration")?;
        if duration <= 0.0 {
            return Err(validation_error(Self::NAME, "'duration' must be a positive number"));
        }
        Ok(Self {
            duration,
            output_dir: r.path("output_dir")?.unwrap_or_else(|| PathBuf::from("parts")),
            prefix: r.string_or("prefix", "part_")?,
            use_input_name: r.bool_or("use_input_name", false)?,
        })
    }

    fn part_name(&self, input: &Path, number: usize) -> String {
        if self.use_input_name {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "part".to_string());
            format!("{stem}_{number:03}.mp4")
        } else {
            format!("{}{number:03}.mp4", self.prefix)
        }
    }
}

impl TransformModule for Cut {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, ctx: &StageContext<'_>, input: &Path, output: &Path) -> CoreResult<()> {
        let total = ctx.prober.duration(input).ok_or_else(|| {
            validation_error(
                Self::NAME,
                format!("could not determine the duration of {}", input.display()),
            )
        })?;

        let dir = &self.output_dir;
        std::fs::create_dir_all(dir)?;

        let plan = segment_plan(total, self.duration);
        let length = fmt_num(self.duration);
        for (i, start) in plan.iter().enumerate() {
            let part = dir.join(self.part_name(input, i + 1));
            let invocation = FfmpegInvocation::new(&part)
                .input_with(&["-ss", fmt_num(*start).as_str()], input)
                .args(&["-t", length.as_str()])
                .default_video_codec()
                .audio(AudioCodec::Copy);
            ctx.run(&invocation)?;
            log::info!("{} Part {}/{} created: {}", ctx.tag(), i + 1, plan.len(), part.display());
        }

        copy_through(input, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::external::mocks::{MockFfmpegSpawner, MockMediaProber};
    use crate::modules::test_support::{arg_after, context};

    #[test]
    fn plan_covers_the_whole_input() {
        assert_eq!(segment_plan(25.0, 10.0), vec![0.0, 10.0, 20.0]);
        assert_eq!(segment_plan(30.0, 10.0).len(), 3);
        assert_eq!(segment_plan(0.5, 10.0), vec![0.0]);
        assert_eq!(segment_plan(1.0, 0.3), vec![0.0, 0.3, 0.6, 0.9]);
        assert_eq!(segment_plan(0.9, 0.3).len(), 3);
        assert!(segment_plan(0.0, 10.0).is_empty());
    }

    #[test]
    fn duration_is_required_and_positive() {
        for params in [ModuleParams::new(), ModuleParams::new().with("duration", 0)] {
            assert_eq!(Cut::from_params(&params).unwrap_err().kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn writes_numbered_parts_and_passes_input_through() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("talk.mp4");
        std::fs::write(&input, b"source").unwrap();
        let output = dir.path().join("run").join("stage_000.mp4");

        let spawner = MockFfmpegSpawner::succeeding();
        let prober = MockMediaProber::new();
        prober.set_duration(&input, 25.0);

        let parts = dir.path().join("parts");
        let cut = Cut::from_params(
            &ModuleParams::new()
                .with("duration", 10)
                .with("output_dir", parts.to_string_lossy().into_owned()),
        )
        .unwrap();
        cut.process(&context(&spawner, &prober), &input, &output).unwrap();

        let calls = spawner.get_received_calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(arg_after(&calls[2], "-ss"), Some("20"));
        assert_eq!(arg_after(&calls[2], "-t"), Some("10"));

        for n in 1..=3 {
            assert!(parts.join(format!("part_{n:03}.mp4")).exists());
        }
        assert_eq!(std::fs::read(&output).unwrap(), b"source");
    }

    #[test]
    fn fractional_segments_keep_the_requested_length() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        std::fs::write(&input, b"source").unwrap();

        let spawner = MockFfmpegSpawner::succeeding();
        let prober = MockMediaProber::new();
        prober.set_duration(&input, 1.0);

        let cut = Cut::from_params(
            &ModuleParams::new()
                .with("duration", 0.3)
                .with("output_dir", dir.path().join("parts").to_string_lossy().into_owned()),
        )
        .unwrap();
        cut.process(&context(&spawner, &prober), &input, &dir.path().join("o.mp4")).unwrap();

        let calls = spawner.get_received_calls();
        assert_eq!(calls.len(), 4);
        for call in &calls {
            assert_eq!(arg_after(call, "-t"), Some("0.3"));
        }
        assert_eq!(arg_after(&calls[3], "-ss"), Some("0.9"));
    }

    #[test]
    fn input_name_prefix() {
        let cut = Cut::from_params(
            &ModuleParams::new().with("duration", 5).with("use_input_name", true),
        )
        .unwrap();
        assert_eq!(cut.part_name(Path::new("/v/holiday.mov"), 2), "holiday_002.mp4");
    }

    #[test]
    fn unknown_duration_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = MockFfmpegSpawner::new();
        let prober = MockMediaProber::new();
        let cut = Cut::from_params(&ModuleParams::new().with("duration", 5)).unwrap();

        let err = cut
            .process(&context(&spawner, &prober), Path::new("in.mp4"), &dir.path().join("o.mp4"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(spawner.get_received_calls().is_empty());
    }
}
