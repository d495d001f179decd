//! FFmpeg invocation builder
//!
//! Every stage describes its ffmpeg run as an [`FfmpegInvocation`]: inputs
//! with their per-input options, an optional filter graph, stream maps, codec
//! settings and the output path. The argument vector is only produced when
//! the invocation is turned into a command.

use crate::config::{DEFAULT_OPUS_BITRATE, DEFAULT_PRESET, DEFAULT_THREADS, DEFAULT_VIDEO_CODEC};
use crate::graph::{FilterGraph, OUTPUT_LABEL};
use ffmpeg_sidecar::command::FfmpegCommand;
use std::path::{Path, PathBuf};

/// Audio handling for the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioCodec {
    /// Stream-copy the mapped audio.
    #[default]
    Copy,
    /// Transcode to Opus at 128k.
    Opus,
    /// Transcode to AAC at the given bitrate in kbit/s.
    Aac(u32),
    /// Drop audio entirely (`-an`).
    Disabled,
}

impl AudioCodec {
    /// Parses the `audio_codec` module parameter.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "copy" => Some(AudioCodec::Copy),
            "libopus" | "opus" => Some(AudioCodec::Opus),
            "aac" => Some(AudioCodec::Aac(128)),
            "none" => Some(AudioCodec::Disabled),
            _ => None,
        }
    }

    fn args(self) -> Vec<String> {
        let args: Vec<&str> = match self {
            AudioCodec::Copy => vec!["-c:a", "copy"],
            AudioCodec::Opus => vec!["-c:a", "libopus", "-b:a", DEFAULT_OPUS_BITRATE, "-application", "audio"],
            AudioCodec::Aac(kbps) => {
                return vec!["-c:a".into(), "aac".into(), "-b:a".into(), format!("{kbps}k")];
            }
            AudioCodec::Disabled => vec!["-an"],
        };
        args.into_iter().map(String::from).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InputSpec {
    options: Vec<String>,
    path: PathBuf,
}

/// Builder describing a single ffmpeg run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfmpegInvocation {
    inputs: Vec<InputSpec>,
    filter_graph: Option<String>,
    maps: Vec<String>,
    output_args: Vec<String>,
    output: PathBuf,
}

impl FfmpegInvocation {
    /// Starts an invocation writing to `output`.
    #[must_use]
    pub fn new(output: &Path) -> Self {
        Self {
            inputs: Vec::new(),
            filter_graph: None,
            maps: Vec::new(),
            output_args: Vec::new(),
            output: output.to_path_buf(),
        }
    }

    /// Adds an input file.
    #[must_use]
    pub fn input(self, path: &Path) -> Self {
        self.input_with(&[], path)
    }

    /// Adds an input file preceded by input options (`-stream_loop`, `-ss`, ...).
    #[must_use]
    pub fn input_with(mut self, options: &[&str], path: &Path) -> Self {
        self.inputs.push(InputSpec {
            options: options.iter().map(|s| s.to_string()).collect(),
            path: path.to_path_buf(),
        });
        self
    }

    /// Uses `graph` as `-filter_complex` and maps its `[out]` pad.
    #[must_use]
    pub fn filter_graph(mut self, graph: &FilterGraph) -> Self {
        debug_assert!(graph.is_terminated(), "filter graph must write exactly one [out] pad: {graph}");
        self.filter_graph = Some(graph.to_string());
        self.maps.insert(0, format!("[{OUTPUT_LABEL}]"));
        self
    }

    /// Adds a `-map` entry.
    #[must_use]
    pub fn map(mut self, spec: &str) -> Self {
        self.maps.push(spec.to_string());
        self
    }

    /// Encodes video with the shared x264 defaults.
    #[must_use]
    pub fn default_video_codec(self) -> Self {
        self.args(&[
            "-c:v",
            DEFAULT_VIDEO_CODEC,
            "-preset",
            DEFAULT_PRESET,
            "-threads",
            DEFAULT_THREADS.to_string().as_str(),
        ])
    }

    #[must_use]
    pub fn audio(mut self, codec: AudioCodec) -> Self {
        self.output_args.extend(codec.args());
        self
    }

    /// Appends a single output option.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Appends output options.
    #[must_use]
    pub fn args(mut self, args: &[&str]) -> Self {
        self.output_args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Full argument vector, excluding the ffmpeg binary itself.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec!["-hide_banner".to_string(), "-y".to_string()];
        for input in &self.inputs {
            args.extend(input.options.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().into_owned());
        }
        if let Some(graph) = &self.filter_graph {
            args.push("-filter_complex".to_string());
            args.push(graph.clone());
        }
        for map in &self.maps {
            args.push("-map".to_string());
            args.push(map.clone());
        }
        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().into_owned());
        args
    }

    /// Space-joined arguments for logging.
    pub fn display_args(&self) -> String {
        self.build_args().join(" ")
    }

    /// Builds the `ffmpeg-sidecar` command.
    pub fn to_command(&self) -> FfmpegCommand {
        let mut cmd = FfmpegCommand::new();
        cmd.args(self.build_args());
        cmd
    }
}
