// ============================================================================
// vidpipe-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg and ffprobe
//
// This module encapsulates interactions with the external command-line tools
// the pipeline delegates to. Stages talk to them through traits so that the
// engine can be exercised without real media or binaries.
//
// KEY COMPONENTS:
// - FfmpegSpawner / FfmpegProcess: ffmpeg process abstraction (ffmpeg-sidecar)
// - MediaProber: read-only duration and stream queries (ffprobe crate)
// - FfmpegInvocation: argument builder for a single ffmpeg run
// - check_dependency: presence check for the external binaries

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Builder for ffmpeg argument vectors
pub mod ffmpeg_builder;

/// Contains traits and implementations for executing ffmpeg commands
pub mod ffmpeg_executor;

/// Contains traits and implementations for executing ffprobe commands
pub mod ffprobe_executor;

#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_builder::{AudioCodec, FfmpegInvocation};
pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner, run_ffmpeg};
pub use ffprobe_executor::{CrateFfprobeExecutor, MediaProber};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `cmd_name -version` and discards its output. Only the ability to
/// start the process matters.
///
/// # Returns
///
/// * `Ok(())` - The command could be started
/// * `Err(CoreError::DependencyNotFound)` - The command is not on the PATH
/// * `Err(CoreError::CommandStart)` - The command exists but failed to start
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_reported_as_missing_dependency() {
        let err = check_dependency("vidpipe-no-such-binary-4711").unwrap_err();
        assert!(matches!(err, CoreError::DependencyNotFound(name) if name == "vidpipe-no-such-binary-4711"));
    }
}
