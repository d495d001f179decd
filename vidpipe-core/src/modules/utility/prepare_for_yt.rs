//! Re-encodes the video into an upload-friendly delivery profile.
//!
//! Inputs carrying several video streams are flattened first: each further
//! stream is laid over the previous result at half opacity, in stream order.

use crate::config::ModuleParams;
use crate::error::CoreResult;
use crate::external::{AudioCodec, FfmpegInvocation};
use crate::graph::{Filter, FilterGraph, Pad};
use crate::modules::{StageContext, TransformModule};
use std::path::Path;

const DELIVERY_ARGS: &[&str] = &[
    "-c:v", "libx264", "-profile:v", "high", "-level", "4.0", "-pix_fmt", "yuv420p", "-crf", "18",
    "-preset", "fast", "-movflags", "+faststart",
];

/// Half-opacity composite of the given video streams of input 0.
fn stack_graph(streams: &[usize]) -> FilterGraph {
    let mut graph = FilterGraph::new();
    let Some((first, rest)) = streams.split_first() else {
        return graph;
    };

    let mut acc = Pad::stream(0, *first);
    for (n, index) in rest.iter().enumerate() {
        let layer = graph.chain(
            vec![Pad::stream(0, *index)],
            vec![
                Filter::new("format", "rgba"),
                Filter::new("colorchannelmixer", "aa=0.5"),
            ],
            &format!("layer{}", n + 1),
        );
        let overlay = vec![Filter::new("overlay", "0:0")];
        if n + 1 == rest.len() {
            graph.finish(vec![acc.clone(), layer], overlay);
        } else {
            acc = graph.chain(vec![acc, layer], overlay, &format!("stack{}", n + 1));
        }
    }
    graph
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrepareForYt;

impl PrepareForYt {
    pub const NAME: &'static str = "utility.prepareforyt";

    pub fn from_params(params: &ModuleParams) -> CoreResult<Self> {
        if !params.is_empty() {
            log::debug!("{} takes no parameters, ignoring {:?}", Self::NAME, params.keys().collect::<Vec<_>>());
        }
        Ok(Self)
    }

    fn invocation(streams: &[usize], input: &Path, output: &Path) -> FfmpegInvocation {
        let invocation = FfmpegInvocation::new(output).input(input);
        let invocation = match streams {
            [_, _, ..] => invocation.filter_graph(&stack_graph(streams)),
            [single] => invocation.map(&format!("0:{single}")),
            [] => invocation.map("0:v:0"),
        };
        invocation
            .map("0:a?")
            .args(DELIVERY_ARGS)
            .audio(AudioCodec::Aac(128))
    }
}

impl TransformModule for PrepareForYt {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(&self, ctx: &StageContext<'_>, input: &Path, output: &Path) -> CoreResult<()> {
        let streams = ctx.prober.video_stream_indices(input);
        log::info!("{} Found {} video stream(s): {:?}", ctx.tag(), streams.len(), streams);

        ctx.run(&Self::invocation(&streams, input, output))?;
        log::info!("{} Prepared for upload: {}", ctx.tag(), output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::{MockFfmpegSpawner, MockMediaProber};
    use crate::modules::test_support::{arg_after, context, single_call};

    #[test]
    fn stacks_extra_streams_at_half_opacity() {
        assert_eq!(
            stack_graph(&[0, 2]).to_string(),
            "[0:2]format=rgba,colorchannelmixer=aa=0.5[layer1];[0:0][layer1]overlay=0:0[out]"
        );
        assert_eq!(
            stack_graph(&[0, 1, 3]).to_string(),
            "[0:1]format=rgba,colorchannelmixer=aa=0.5[layer1];[0:0][layer1]overlay=0:0[stack1];\
             [0:3]format=rgba,colorchannelmixer=aa=0.5[layer2];[stack1][layer2]overlay=0:0[out]"
        );
    }

    #[test]
    fn single_stream_uses_delivery_profile() {
        let args = PrepareForYt::invocation(&[0], Path::new("in.mp4"), Path::new("out.mp4")).build_args();
        assert!(!args.iter().any(|a| a == "-filter_complex"));
        assert_eq!(arg_after(&args, "-map"), Some("0:0"));
        assert_eq!(arg_after(&args, "-profile:v"), Some("high"));
        assert_eq!(arg_after(&args, "-level"), Some("4.0"));
        assert_eq!(arg_after(&args, "-crf"), Some("18"));
        assert_eq!(arg_after(&args, "-movflags"), Some("+faststart"));
        assert_eq!(arg_after(&args, "-b:a"), Some("128k"));
    }

    #[test]
    fn probe_failure_falls_back_to_first_video_stream() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = MockFfmpegSpawner::succeeding();
        let prober = MockMediaProber::new();

        PrepareForYt
            .process(&context(&spawner, &prober), Path::new("in.mp4"), &dir.path().join("yt.mp4"))
            .unwrap();
        assert_eq!(arg_after(&single_call(&spawner), "-map"), Some("0:v:0"));
    }

    #[test]
    fn multiple_streams_are_composited() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = MockFfmpegSpawner::succeeding();
        let prober = MockMediaProber::new();
        prober.set_video_streams(Path::new("in.mp4"), vec![0, 1]);

        PrepareForYt
            .process(&context(&spawner, &prober), Path::new("in.mp4"), &dir.path().join("yt.mp4"))
            .unwrap();
        let args = single_call(&spawner);
        assert_eq!(arg_after(&args, "-map"), Some("[out]"));
        assert!(arg_after(&args, "-filter_complex").is_some_and(|g| g.contains("[0:0][layer1]overlay")));
    }
}
