//! Stage progress bar for interactive runs.
//!
//! [`StageProgressBar`] listens to pipeline events and advances an indicatif
//! bar by one step per completed stage. The bar is drawn on stderr and is
//! hidden automatically when stderr is not a terminal.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;
use vidpipe_core::{Event, EventHandler, format_duration};

const TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg} ({elapsed})";

pub struct StageProgressBar {
    bar: Mutex<Option<ProgressBar>>,
    draw_target: fn() -> ProgressDrawTarget,
}

impl StageProgressBar {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            draw_target: ProgressDrawTarget::stderr,
        }
    }

    /// Bar that never draws, for tests.
    pub fn hidden() -> Self {
        Self {
            bar: Mutex::new(None),
            draw_target: ProgressDrawTarget::hidden,
        }
    }

    fn start(&self, stages: usize) -> ProgressBar {
        let bar = ProgressBar::with_draw_target(Some(stages as u64), (self.draw_target)());
        let style = ProgressStyle::default_bar()
            .template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##.");
        bar.set_style(style);
        bar
    }

    /// Position of the current bar, if a run is in progress.
    pub fn position(&self) -> Option<u64> {
        self.bar
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(ProgressBar::position))
    }
}

impl Default for StageProgressBar {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for StageProgressBar {
    fn handle(&self, event: &Event) {
        let Ok(mut guard) = self.bar.lock() else {
            return;
        };
        match event {
            Event::PipelineStarted { stages, .. } => {
                *guard = Some(self.start(*stages));
            }
            Event::StageStarted {
                stage,
                total,
                module,
                ..
            } => {
                if let Some(bar) = guard.as_ref() {
                    bar.set_message(format!("stage {}/{}: {}", stage + 1, total, module));
                }
            }
            Event::StageCompleted { .. } => {
                if let Some(bar) = guard.as_ref() {
                    bar.inc(1);
                }
            }
            Event::StageFailed { stage, module, .. } => {
                if let Some(bar) = guard.as_ref() {
                    bar.abandon_with_message(format!("stage {} ({}) failed", stage + 1, module));
                }
            }
            Event::PipelineCompleted { elapsed, .. } => {
                if let Some(bar) = guard.as_ref() {
                    bar.finish_with_message(format!("done in {}", format_duration(elapsed.as_secs_f64())));
                }
            }
            Event::ModuleResolved { .. } | Event::CleanupFailed { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn stage_event(stage: usize, completed: bool) -> Event {
        if completed {
            Event::StageCompleted {
                run_id: "abc123".to_string(),
                stage,
                total: 2,
                module: "crop".to_string(),
                elapsed: Duration::from_millis(10),
            }
        } else {
            Event::StageStarted {
                run_id: "abc123".to_string(),
                stage,
                total: 2,
                module: "crop".to_string(),
                input: PathBuf::from("in.mp4"),
                output: PathBuf::from("out.mp4"),
            }
        }
    }

    #[test]
    fn advances_once_per_completed_stage() {
        let handler = StageProgressBar::hidden();
        assert_eq!(handler.position(), None);

        handler.handle(&Event::PipelineStarted {
            run_id: "abc123".to_string(),
            input: PathBuf::from("in.mp4"),
            output: PathBuf::from("out.mp4"),
            stages: 2,
        });
        assert_eq!(handler.position(), Some(0));

        handler.handle(&stage_event(0, false));
        handler.handle(&stage_event(0, true));
        handler.handle(&stage_event(1, false));
        assert_eq!(handler.position(), Some(1));
        handler.handle(&stage_event(1, true));
        assert_eq!(handler.position(), Some(2));
    }
}
