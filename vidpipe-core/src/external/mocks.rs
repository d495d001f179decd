// vidpipe-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for unit tests and when the "test-mocks" feature is enabled.

use super::{FfmpegProcess, FfmpegSpawner, MediaProber};
use crate::error::{CoreError, CoreResult};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;

/// Builds an `ExitStatus` carrying `code` as the process exit code.
pub fn exit_status(code: i32) -> ExitStatus {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }
    #[cfg(windows)]
    {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(code as u32)
    }
}

/// Mock implementation of FfmpegProcess.
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Vec<FfmpegEvent>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events(
        &mut self,
        handler: &mut dyn FnMut(FfmpegEvent) -> CoreResult<()>,
    ) -> CoreResult<()> {
        for event in self.events_to_emit.drain(..) {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

enum MockOutcome {
    Exit {
        events: Vec<FfmpegEvent>,
        code: i32,
        create_dummy_output: bool,
    },
    SpawnError(CoreError),
}

/// Represents an expected ffmpeg command call and its mock result.
struct MockFfmpegExpectation {
    arg_pattern: String,
    outcome: MockOutcome,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
///
/// Each spawn consumes the first expectation whose pattern is contained in
/// any argument. Unmatched commands succeed and create their output file
/// when the spawner was built with [`MockFfmpegSpawner::succeeding`];
/// otherwise they panic.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Rc<RefCell<Vec<MockFfmpegExpectation>>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
    succeed_by_default: bool,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    /// Spawner on which every unmatched command succeeds and writes a
    /// dummy output file.
    pub fn succeeding() -> Self {
        Self {
            succeed_by_default: true,
            ..Default::default()
        }
    }

    pub fn add_success_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        create_dummy_output: bool,
    ) {
        self.push(arg_pattern, MockOutcome::Exit {
            events,
            code: 0,
            create_dummy_output,
        });
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.push(arg_pattern, MockOutcome::SpawnError(error));
    }

    pub fn add_exit_error_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        exit_code: i32,
    ) {
        self.push(arg_pattern, MockOutcome::Exit {
            events,
            code: exit_code,
            create_dummy_output: false,
        });
    }

    fn push(&self, arg_pattern: &str, outcome: MockOutcome) {
        self.expectations.borrow_mut().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            outcome,
        });
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }

    fn create_dummy_output(args: &[String]) {
        let Some(output_path) = args.last().map(PathBuf::from) else {
            log::warn!("MockFfmpegSpawner couldn't find output path in args to create dummy file.");
            return;
        };
        if let Some(parent) = output_path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::error!("MockFfmpegSpawner failed to create parent dir {:?}: {}", parent, e);
            }
        }
        match std::fs::write(&output_path, b"mock") {
            Ok(()) => log::debug!("MockFfmpegSpawner created dummy output file: {:?}", output_path),
            Err(e) => log::error!(
                "MockFfmpegSpawner failed to create dummy output file {:?}: {}",
                output_path,
                e
            ),
        }
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Box<dyn FfmpegProcess>> {
        let args: Vec<String> = cmd
            .as_inner()
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        self.received_calls.borrow_mut().push(args.clone());

        let found = {
            let mut expectations = self.expectations.borrow_mut();
            expectations
                .iter()
                .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)))
                .map(|index| expectations.remove(index))
        };

        let outcome = match found {
            Some(expectation) => {
                log::debug!(
                    "MockFfmpegSpawner: Matched expectation with pattern '{}'",
                    expectation.arg_pattern
                );
                expectation.outcome
            }
            None if self.succeed_by_default => MockOutcome::Exit {
                events: Vec::new(),
                code: 0,
                create_dummy_output: true,
            },
            None => panic!("MockFfmpegSpawner: No expectation found for command args: {:?}", args),
        };

        match outcome {
            MockOutcome::Exit {
                events,
                code,
                create_dummy_output,
            } => {
                if create_dummy_output {
                    Self::create_dummy_output(&args);
                }
                Ok(Box::new(MockFfmpegProcess {
                    events_to_emit: events,
                    exit_status: exit_status(code),
                }))
            }
            MockOutcome::SpawnError(err) => Err(err),
        }
    }
}

/// Mock implementation of MediaProber with per-path answers.
#[derive(Clone, Default)]
pub struct MockMediaProber {
    durations: Rc<RefCell<HashMap<PathBuf, f64>>>,
    video_streams: Rc<RefCell<HashMap<PathBuf, Vec<usize>>>>,
}

impl MockMediaProber {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set_duration(&self, path: &Path, seconds: f64) {
        self.durations.borrow_mut().insert(path.to_path_buf(), seconds);
    }

    pub fn set_video_streams(&self, path: &Path, indices: Vec<usize>) {
        self.video_streams.borrow_mut().insert(path.to_path_buf(), indices);
    }
}

impl MediaProber for MockMediaProber {
    fn duration(&self, path: &Path) -> Option<f64> {
        self.durations.borrow().get(path).copied()
    }

    fn video_stream_indices(&self, path: &Path) -> Vec<usize> {
        self.video_streams
            .borrow()
            .get(path)
            .cloned()
            .unwrap_or_default()
    }
}
