// ============================================================================
// vidpipe-core/src/pipeline.rs
// ============================================================================
//
// PIPELINE EXECUTION: Sequential Stage Orchestration
//
// Turns a PipelineSpec into a chain of configured modules and runs them one
// after another, each stage reading the previous stage's output.
//
// KEY COMPONENTS:
// - Pipeline: owns the spec, run settings and event handlers
// - PipelineState: Idle -> Resolving -> Running(i of N) -> Completed | Failed
// - PipelineReport: summary of a successful run
//
// WORKFLOW:
// 1. Resolve input/output paths and construct every module (no media I/O)
// 2. Check the input exists and create the output directory
// 3. Run stage i from the previous output into stage_<i>.<ext> inside a
//    private run directory; the last stage writes the declared output
// 4. On success remove the intermediates (unless kept); on failure leave
//    them in place and report the failing stage

// ---- Internal crate imports ----
use crate::config::{DEFAULT_STAGE_EXTENSION, PipelineSettings, PipelineSpec};
use crate::error::{CoreError, CoreResult};
use crate::events::{Event, EventDispatcher, EventHandler};
use crate::external::{FfmpegSpawner, MediaProber};
use crate::modules::{StageContext, TransformModule};
use crate::registry;
use crate::temp_files::{RunDirectory, generate_run_id};
use crate::utils::format_duration;

// ---- External crate imports ----
use log::{debug, error, info};

// ---- Standard library imports ----
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Execution state of a [`Pipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Resolving,
    Running { stage: usize, total: usize },
    Completed,
    /// `stage` is `None` when the run failed before any stage started.
    Failed { stage: Option<usize> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub index: usize,
    pub module: String,
    pub output: PathBuf,
    pub elapsed: Duration,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub run_id: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub stages: Vec<StageReport>,
    pub elapsed: Duration,
    /// Directory that held the intermediates, if any were needed.
    pub run_dir: Option<PathBuf>,
    /// False when intermediates were kept or could not all be removed.
    pub cleaned_up: bool,
}

pub struct Pipeline {
    spec: PipelineSpec,
    settings: PipelineSettings,
    dispatcher: EventDispatcher,
    state: PipelineState,
}

impl Pipeline {
    pub fn new(spec: PipelineSpec, settings: PipelineSettings) -> Self {
        Self {
            spec,
            settings,
            dispatcher: EventDispatcher::new(),
            state: PipelineState::Idle,
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.dispatcher.add_handler(handler);
    }

    pub fn spec(&self) -> &PipelineSpec {
        &self.spec
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Constructs every configured module without touching any media.
    pub fn resolve_modules(&self) -> CoreResult<Vec<Box<dyn TransformModule>>> {
        self.spec.validate()?;
        self.spec
            .modules
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let module = registry::build(spec)?;
                self.dispatcher.emit(Event::ModuleResolved {
                    index,
                    name: spec.name.clone(),
                    key: module.name().to_string(),
                });
                Ok(module)
            })
            .collect()
    }

    /// Runs the pipeline. Overrides take precedence over the configured paths.
    pub fn process(
        &mut self,
        spawner: &dyn FfmpegSpawner,
        prober: &dyn MediaProber,
        input_override: Option<&Path>,
        output_override: Option<&Path>,
    ) -> CoreResult<PipelineReport> {
        self.state = PipelineState::Resolving;
        let result = self.run(spawner, prober, input_override, output_override);
        self.state = match &result {
            Ok(_) => PipelineState::Completed,
            Err(e) => PipelineState::Failed { stage: e.stage() },
        };
        result
    }

    fn run(
        &mut self,
        spawner: &dyn FfmpegSpawner,
        prober: &dyn MediaProber,
        input_override: Option<&Path>,
        output_override: Option<&Path>,
    ) -> CoreResult<PipelineReport> {
        let started = Instant::now();
        let (input, output) = self.spec.resolve_paths(input_override, output_override)?;
        let modules = self.resolve_modules()?;

        if !input.is_file() {
            return Err(CoreError::InputNotFound(input));
        }
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let run_id = generate_run_id();
        let total = modules.len();
        let run_dir = if total > 1 {
            Some(self.create_run_dir(&run_id, &output)?)
        } else {
            None
        };

        info!(
            "[{}] Starting pipeline: {} -> {} ({} stage{})",
            run_id,
            input.display(),
            output.display(),
            total,
            if total == 1 { "" } else { "s" }
        );
        self.dispatcher.emit(Event::PipelineStarted {
            run_id: run_id.clone(),
            input: input.clone(),
            output: output.clone(),
            stages: total,
        });

        let mut stages = Vec::with_capacity(total);
        let mut intermediates = Vec::new();
        let mut current = input.clone();

        for (stage, module) in modules.iter().enumerate() {
            let stage_output = match &run_dir {
                Some(dir) if stage + 1 < total => dir.stage_path(stage),
                _ => output.clone(),
            };
            self.state = PipelineState::Running { stage, total };
            let ctx = StageContext {
                spawner,
                prober,
                run_id: &run_id,
                stage,
                total,
            };

            info!("{} Running {}", ctx.tag(), module.name());
            debug!("{} {} -> {}", ctx.tag(), current.display(), stage_output.display());
            self.dispatcher.emit(Event::StageStarted {
                run_id: run_id.clone(),
                stage,
                total,
                module: module.name().to_string(),
                input: current.clone(),
                output: stage_output.clone(),
            });

            let stage_started = Instant::now();
            if let Err(e) = module.process(&ctx, &current, &stage_output) {
                error!("{} {} failed: {}", ctx.tag(), module.name(), e);
                if let Some(dir) = &run_dir {
                    error!(
                        "{} Intermediate files kept in {}",
                        ctx.tag(),
                        dir.path().display()
                    );
                }
                self.dispatcher.emit(Event::StageFailed {
                    run_id: run_id.clone(),
                    stage,
                    total,
                    module: module.name().to_string(),
                    message: e.to_string(),
                });
                return Err(CoreError::StageFailed {
                    stage,
                    module: module.name().to_string(),
                    source: Box::new(e),
                });
            }

            let elapsed = stage_started.elapsed();
            self.dispatcher.emit(Event::StageCompleted {
                run_id: run_id.clone(),
                stage,
                total,
                module: module.name().to_string(),
                elapsed,
            });
            stages.push(StageReport {
                index: stage,
                module: module.name().to_string(),
                output: stage_output.clone(),
                elapsed,
            });
            if stage_output != output {
                intermediates.push(stage_output.clone());
            }
            current = stage_output;
        }

        let cleaned_up = match &run_dir {
            Some(dir) if self.settings.keep_temp => {
                info!("[{}] Keeping intermediate files in {}", run_id, dir.path().display());
                false
            }
            Some(dir) => {
                let failures = dir.cleanup(&intermediates);
                for (path, e) in &failures {
                    self.dispatcher.emit(Event::CleanupFailed {
                        path: path.clone(),
                        message: e.to_string(),
                    });
                }
                failures.is_empty()
            }
            None => true,
        };

        let elapsed = started.elapsed();
        info!(
            "[{}] Pipeline completed in {}: {}",
            run_id,
            format_duration(elapsed.as_secs_f64()),
            output.display()
        );
        self.dispatcher.emit(Event::PipelineCompleted {
            run_id: run_id.clone(),
            output: output.clone(),
            elapsed,
        });

        Ok(PipelineReport {
            run_id,
            input,
            output,
            stages,
            elapsed,
            run_dir: run_dir.map(|dir| dir.path().to_path_buf()),
            cleaned_up,
        })
    }

    fn create_run_dir(&self, run_id: &str, output: &Path) -> CoreResult<RunDirectory> {
        let base = match &self.settings.temp_dir {
            Some(dir) => dir.clone(),
            None => output
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        let extension = output
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(DEFAULT_STAGE_EXTENSION);

        let dir = RunDirectory::create(&base, run_id, extension)?;
        debug!("[{}] Run directory: {}", run_id, dir.path().display());
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModuleParams, ModuleSpec, PipelineSettingsBuilder};
    use crate::error::ErrorKind;
    use crate::external::mocks::{MockFfmpegSpawner, MockMediaProber};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Event>>);

    impl EventHandler for Recorder {
        fn handle(&self, event: &Event) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    fn three_stage_spec(dir: &Path) -> PipelineSpec {
        let input = dir.join("in.mp4");
        std::fs::write(&input, b"source").unwrap();
        PipelineSpec::new(
            input,
            dir.join("out").join("final.mp4"),
            vec![
                ModuleSpec::new("resize", ModuleParams::new().with("width", 640).with("height", 360)),
                ModuleSpec::new("deleteaudio", ModuleParams::new()),
                ModuleSpec::new("crop", ModuleParams::new().with("width", 320).with("height", 180)),
            ],
        )
    }

    fn settings(dir: &Path) -> PipelineSettings {
        PipelineSettingsBuilder::new().temp_dir(dir.join("tmp")).build()
    }

    #[test]
    fn stages_chain_through_intermediates() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = MockFfmpegSpawner::succeeding();
        let prober = MockMediaProber::new();
        let mut pipeline = Pipeline::new(three_stage_spec(dir.path()), settings(dir.path()));

        let report = pipeline.process(&spawner, &prober, None, None).unwrap();

        let calls = spawner.get_received_calls();
        assert_eq!(calls.len(), 3);
        let stage0_out = calls[0].last().unwrap().clone();
        assert!(stage0_out.ends_with("stage_000.mp4"));
        assert!(calls[1].contains(&stage0_out));
        assert!(calls[2].last().unwrap().ends_with("final.mp4"));

        assert_eq!(report.stages.len(), 3);
        assert!(report.cleaned_up);
        assert!(!report.run_dir.unwrap().exists());
        assert!(dir.path().join("out/final.mp4").exists());
        assert_eq!(pipeline.state(), PipelineState::Completed);
    }

    #[test]
    fn failing_stage_keeps_intermediates() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = MockFfmpegSpawner::succeeding();
        spawner.add_exit_error_expectation("-an", Vec::new(), 1);
        let prober = MockMediaProber::new();
        let recorder = Arc::new(Recorder::default());
        let mut pipeline = Pipeline::new(three_stage_spec(dir.path()), settings(dir.path()));
        pipeline.add_handler(recorder.clone());

        let err = pipeline.process(&spawner, &prober, None, None).unwrap_err();

        assert_eq!(err.stage(), Some(1));
        assert_eq!(err.kind(), ErrorKind::Processing);
        assert_eq!(pipeline.state(), PipelineState::Failed { stage: Some(1) });
        assert_eq!(spawner.get_received_calls().len(), 2);

        let first_output = PathBuf::from(spawner.get_received_calls()[0].last().unwrap());
        assert!(first_output.exists());
        let events = recorder.0.lock().unwrap();
        assert!(events.iter().any(|e| matches!(e, Event::StageFailed { stage: 1, .. })));
        assert!(!events.iter().any(|e| matches!(e, Event::PipelineCompleted { .. })));
    }

    #[test]
    fn resolution_failure_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut spec = three_stage_spec(dir.path());
        spec.modules.push(ModuleSpec::new("sharpen", ModuleParams::new()));
        let spawner = MockFfmpegSpawner::new();
        let prober = MockMediaProber::new();
        let mut pipeline = Pipeline::new(spec, settings(dir.path()));

        let err = pipeline.process(&spawner, &prober, None, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);
        assert_eq!(pipeline.state(), PipelineState::Failed { stage: None });
        assert!(spawner.get_received_calls().is_empty());
        assert!(!dir.path().join("tmp").exists());
    }

    #[test]
    fn missing_input_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = MockFfmpegSpawner::new();
        let prober = MockMediaProber::new();
        let mut pipeline = Pipeline::new(three_stage_spec(dir.path()), settings(dir.path()));

        let missing = dir.path().join("missing.mp4");
        let err = pipeline
            .process(&spawner, &prober, Some(&missing), None)
            .unwrap_err();
        assert!(matches!(err, CoreError::InputNotFound(ref p) if *p == missing));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn single_stage_writes_output_directly() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"source").unwrap();
        let spec = PipelineSpec::new(
            &input,
            dir.path().join("out.mp4"),
            vec![ModuleSpec::new("deleteaudio", ModuleParams::new())],
        );
        let spawner = MockFfmpegSpawner::succeeding();
        let prober = MockMediaProber::new();

        let report = Pipeline::new(spec, settings(dir.path()))
            .process(&spawner, &prober, None, None)
            .unwrap();
        assert!(report.run_dir.is_none());
        assert_eq!(
            PathBuf::from(spawner.get_received_calls()[0].last().unwrap()),
            dir.path().join("out.mp4")
        );
    }

    #[test]
    fn keep_temp_leaves_intermediates() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = MockFfmpegSpawner::succeeding();
        let prober = MockMediaProber::new();
        let settings = PipelineSettingsBuilder::new()
            .temp_dir(dir.path().join("tmp"))
            .keep_temp(true)
            .build();

        let report = Pipeline::new(three_stage_spec(dir.path()), settings)
            .process(&spawner, &prober, None, None)
            .unwrap();
        assert!(!report.cleaned_up);
        let run_dir = report.run_dir.unwrap();
        assert!(run_dir.join("stage_000.mp4").exists());
        assert!(run_dir.join("stage_001.mp4").exists());
    }
}
