// ============================================================================
// vidpipe-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Management and Abstraction
//
// This module provides abstractions for spawning and interacting with FFmpeg
// processes. Pipeline stages only ever see the traits, so tests can replace
// the real process with a scripted mock.
//
// KEY COMPONENTS:
// - FfmpegProcess: Trait representing an active FFmpeg process
// - FfmpegSpawner: Trait for creating new FFmpeg processes
// - SidecarSpawner: Concrete implementation using ffmpeg-sidecar
// - run_ffmpeg: spawn, collect diagnostics, map the exit status

use super::ffmpeg_builder::FfmpegInvocation;
use crate::error::{CoreResult, command_failed_error, command_start_error, command_wait_error};
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use std::process::ExitStatus;

// --- FFmpeg Execution Abstraction ---

/// Trait representing an active ffmpeg process instance.
pub trait FfmpegProcess {
    /// Processes events from the running command using the provided handler.
    fn handle_events(
        &mut self,
        handler: &mut dyn FnMut(FfmpegEvent) -> CoreResult<()>,
    ) -> CoreResult<()>;

    /// Waits for the command to complete and returns its exit status.
    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Trait representing something that can spawn an FfmpegProcess.
pub trait FfmpegSpawner {
    /// Spawns the ffmpeg command, consuming the command object.
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Box<dyn FfmpegProcess>>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

/// Wrapper around `ffmpeg_sidecar::child::FfmpegChild` implementing `FfmpegProcess`.
pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events(
        &mut self,
        handler: &mut dyn FnMut(FfmpegEvent) -> CoreResult<()>,
    ) -> CoreResult<()> {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {}", e);
            command_failed_error(
                "ffmpeg (sidecar - get iter)",
                ExitStatus::default(),
                e.to_string(),
            )
        })?;
        for event in iterator {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0
            .wait()
            .map_err(|e| command_wait_error("ffmpeg (sidecar)", e))
    }
}

/// Concrete implementation of `FfmpegSpawner` using `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Box<dyn FfmpegProcess>> {
        cmd.spawn()
            .map(|child| Box::new(SidecarProcess(child)) as Box<dyn FfmpegProcess>)
            .map_err(|e| command_start_error("ffmpeg (sidecar)", e))
    }
}

/// Runs an invocation to completion.
///
/// Error and fatal log lines are collected as diagnostics; a non-zero exit
/// status becomes a `CommandFailed` error carrying them.
pub fn run_ffmpeg(spawner: &dyn FfmpegSpawner, invocation: &FfmpegInvocation) -> CoreResult<()> {
    log::debug!("Running ffmpeg {}", invocation.display_args());

    let mut process = spawner.spawn(invocation.to_command())?;
    let mut diagnostics: Vec<String> = Vec::new();

    let mut handler = |event: FfmpegEvent| {
        match event {
            FfmpegEvent::Error(message)
            | FfmpegEvent::Log(LogLevel::Error, message)
            | FfmpegEvent::Log(LogLevel::Fatal, message) => {
                log::debug!("ffmpeg: {}", message);
                diagnostics.push(message);
            }
            FfmpegEvent::Log(LogLevel::Warning, message) => {
                log::debug!("ffmpeg warning: {}", message);
            }
            FfmpegEvent::Progress(progress) => {
                log::trace!(
                    "ffmpeg progress: frame={} time={} speed={}x",
                    progress.frame,
                    progress.time,
                    progress.speed
                );
            }
            _ => {}
        }
        Ok(())
    };
    process.handle_events(&mut handler)?;

    let status = process.wait()?;
    if !status.success() {
        log::error!("ffmpeg exited with {}", status);
        return Err(command_failed_error("ffmpeg", status, diagnostics.join("\n")));
    }
    Ok(())
}
