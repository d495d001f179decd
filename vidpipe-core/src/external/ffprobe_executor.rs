//! FFprobe integration for the read-only media queries stages need.
//!
//! Probes never fail: a file that cannot be probed reports an unknown
//! duration or no video streams, and the calling module decides how to
//! degrade.

use ffprobe::ffprobe;
use std::path::Path;

/// Read-only media inspection used by modules that adapt to their input.
pub trait MediaProber {
    /// Duration in seconds, or `None` when it cannot be determined.
    fn duration(&self, path: &Path) -> Option<f64>;

    /// Absolute stream indices of the file's video streams, in order.
    fn video_stream_indices(&self, path: &Path) -> Vec<usize>;
}

/// [`MediaProber`] backed by the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl MediaProber for CrateFfprobeExecutor {
    fn duration(&self, path: &Path) -> Option<f64> {
        log::debug!("Running ffprobe (via crate) for duration on: {}", path.display());
        match ffprobe(path) {
            Ok(metadata) => {
                let duration = metadata
                    .format
                    .duration
                    .as_deref()
                    .and_then(|d| d.trim().parse::<f64>().ok())
                    .filter(|d| d.is_finite() && *d > 0.0);
                if duration.is_none() {
                    log::warn!("ffprobe reported no usable duration for {}", path.display());
                }
                duration
            }
            Err(err) => {
                log::warn!("ffprobe failed for {}: {}", path.display(), err);
                None
            }
        }
    }

    fn video_stream_indices(&self, path: &Path) -> Vec<usize> {
        log::debug!("Running ffprobe (via crate) for video streams on: {}", path.display());
        match ffprobe(path) {
            Ok(metadata) => metadata
                .streams
                .iter()
                .filter(|s| s.codec_type.as_deref() == Some("video"))
                .filter_map(|s| usize::try_from(s.index).ok())
                .collect(),
            Err(err) => {
                log::warn!("ffprobe failed for {}: {}", path.display(), err);
                Vec::new()
            }
        }
    }
}
