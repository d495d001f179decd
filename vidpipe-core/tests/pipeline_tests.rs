// vidpipe-core/tests/pipeline_tests.rs

use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use vidpipe_core::config::PipelineSettingsBuilder;
use vidpipe_core::events::{Event, EventHandler, JsonProgressHandler};
use vidpipe_core::external::mocks::{MockFfmpegSpawner, MockMediaProber};
use vidpipe_core::{CoreError, ErrorKind, ModuleParams, ModuleSpec, Pipeline, PipelineSpec, PipelineState};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

fn create_dummy_file(dir: &Path, filename: &str) -> PathBuf {
    let file_path = dir.join(filename);
    let mut file = File::create(&file_path).expect("Failed to create dummy file");
    file.write_all(b"dummy content").expect("Failed to write dummy content");
    file_path
}

#[derive(Default)]
struct RecordingHandler {
    events: Mutex<Vec<Event>>,
}

impl EventHandler for RecordingHandler {
    fn handle(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

const PIPELINE: &str = r#"
modules:
  - name: crop
    params:
      width: 1280
      height: 720
      position: center
  - name: Resize
    params:
      width: 1920
      height: 1080
  - name: addvideo
    params:
      video_path: PIP
      loop: true
      scale: 0.25
      position: bottomright
  - name: deleteaudio
"#;

#[test]
fn test_yaml_pipeline_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let input = create_dummy_file(tmp.path(), "main.mp4");
    let pip = create_dummy_file(tmp.path(), "pip.mp4");
    let output = tmp.path().join("renders").join("final.mp4");

    let spec = PipelineSpec::from_yaml_str(&PIPELINE.replace("PIP", &pip.to_string_lossy()))?;
    let settings = PipelineSettingsBuilder::new().temp_dir(tmp.path().join("work")).build();

    let spawner = MockFfmpegSpawner::succeeding();
    let prober = MockMediaProber::new();
    prober.set_duration(&pip, 4.0);

    let recorder = Arc::new(RecordingHandler::default());
    let mut pipeline = Pipeline::new(spec, settings);
    pipeline.add_handler(recorder.clone());

    let report = pipeline.process(&spawner, &prober, Some(&input), Some(&output))?;

    let calls = spawner.get_received_calls();
    assert_eq!(calls.len(), 4);
    assert!(calls[0].iter().any(|a| a == "[0:v]crop=1280:720:(in_w-1280)/2:(in_h-720)/2[out]"));
    // The stage-2 input is the stage-1 output, whose duration is unknown.
    assert!(calls[2].windows(2).any(|w| w[0] == "-stream_loop" && w[1] == "-1"));
    assert!(calls[3].iter().any(|a| a == "-an"));
    assert_eq!(calls[3].last().map(PathBuf::from), Some(output.clone()));

    assert!(output.exists());
    assert!(report.cleaned_up);
    assert_eq!(pipeline.state(), PipelineState::Completed);
    assert!(!tmp.path().join("work").read_dir()?.any(|_| true), "run directory left behind");

    let events = recorder.events.lock().unwrap();
    let resolved: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            Event::ModuleResolved { key, .. } => Some(key.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(resolved, vec!["crop", "resize", "addvideo", "deleteaudio"]);
    assert!(matches!(events.last(), Some(Event::PipelineCompleted { .. })));
    Ok(())
}

#[test]
fn test_engine_diagnostics_surface_in_error() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let input = create_dummy_file(tmp.path(), "in.mp4");
    let spec = PipelineSpec::new(
        &input,
        tmp.path().join("out.mp4"),
        vec![
            ModuleSpec::new("resize", ModuleParams::new()),
            ModuleSpec::new("pad", ModuleParams::new().with("color", "notacolor")),
        ],
    );

    let spawner = MockFfmpegSpawner::succeeding();
    spawner.add_exit_error_expectation(
        "notacolor",
        vec![
            FfmpegEvent::Log(LogLevel::Info, "Stream mapping:".to_string()),
            FfmpegEvent::Log(LogLevel::Error, "Cannot find color 'notacolor'".to_string()),
        ],
        1,
    );
    let prober = MockMediaProber::new();

    let buffer = SharedBuffer::default();
    let mut pipeline = Pipeline::new(spec, PipelineSettingsBuilder::new().build());
    pipeline.add_handler(Arc::new(JsonProgressHandler::with_writer(Box::new(buffer.clone()))));

    let err = pipeline.process(&spawner, &prober, None, None).unwrap_err();
    assert!(matches!(err, CoreError::StageFailed { stage: 1, ref module, .. } if module == "pad"));
    assert_eq!(err.kind(), ErrorKind::Processing);
    let message = err.to_string();
    assert!(message.starts_with("Stage 2 (pad) failed"), "{message}");
    assert!(message.contains("Cannot find color 'notacolor'"), "{message}");
    assert!(!message.contains("Stream mapping"), "{message}");

    let json = String::from_utf8(buffer.0.lock().unwrap().clone())?;
    let types: Vec<String> = json
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).map(|v| v["type"].as_str().unwrap_or("").to_string()))
        .collect::<Result<_, _>>()?;
    assert_eq!(types.last().map(String::as_str), Some("stage_failed"));
    assert!(types.iter().any(|t| t == "stage_completed"));
    Ok(())
}

#[test]
fn test_construction_errors_precede_media_io() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let spawner = MockFfmpegSpawner::new();
    let prober = MockMediaProber::new();

    let cases = [
        (ModuleSpec::new("watermark", ModuleParams::new().with("image_path", "/missing/logo.png")), ErrorKind::AssetNotFound),
        (ModuleSpec::new("resize", ModuleParams::new().with("width", -5)), ErrorKind::Validation),
        (ModuleSpec::new("blur", ModuleParams::new()), ErrorKind::Resolution),
    ];

    for (module, kind) in cases {
        // Input does not exist either: construction errors must win.
        let spec = PipelineSpec::new(tmp.path().join("nope.mp4"), tmp.path().join("out.mp4"), vec![module]);
        let mut pipeline = Pipeline::new(spec, PipelineSettingsBuilder::new().build());
        let err = pipeline.process(&spawner, &prober, None, None).unwrap_err();
        assert_eq!(err.kind(), kind, "{err}");
        assert_eq!(pipeline.state(), PipelineState::Failed { stage: None });
    }
    assert!(spawner.get_received_calls().is_empty());
    Ok(())
}

#[test]
fn test_cut_side_outputs_and_passthrough() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let input = create_dummy_file(tmp.path(), "lecture.mp4");
    let parts = tmp.path().join("parts");
    let output = tmp.path().join("out.mp4");

    let spec = PipelineSpec::new(
        &input,
        &output,
        vec![
            ModuleSpec::new(
                "cut",
                ModuleParams::new()
                    .with("duration", 60)
                    .with("output_dir", parts.to_string_lossy().into_owned())
                    .with("use_input_name", true),
            ),
            ModuleSpec::new("deleteaudio", ModuleParams::new()),
        ],
    );

    let spawner = MockFfmpegSpawner::succeeding();
    let prober = MockMediaProber::new();
    prober.set_duration(&input, 150.0);

    Pipeline::new(spec, PipelineSettingsBuilder::new().build()).process(&spawner, &prober, None, None)?;

    for n in 1..=3 {
        assert!(parts.join(format!("lecture_{n:03}.mp4")).exists());
    }
    let calls = spawner.get_received_calls();
    assert_eq!(calls.len(), 4);
    // deleteaudio reads the passed-through copy of the original input
    let stage_input = calls[3].windows(2).find(|w| w[0] == "-i").map(|w| PathBuf::from(&w[1]));
    assert!(stage_input.is_some_and(|p| p.ends_with("stage_000.mp4")));
    Ok(())
}
