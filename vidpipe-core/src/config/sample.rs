//! Example pipeline generation.
//!
//! Produces a pipeline listing one entry per built-in module with
//! illustrative parameters. The CLI's `generate` command writes it as YAML.

use super::{ModuleParams, ModuleSpec, PipelineSpec};
use serde_json::json;

/// Returns an example pipeline covering every built-in module.
pub fn sample_pipeline() -> PipelineSpec {
    let modules = vec![
        ModuleSpec::new(
            "resize",
            ModuleParams::new()
                .with("width", 1280)
                .with("height", 720)
                .with("keep_aspect_ratio", true),
        ),
        ModuleSpec::new(
            "crop",
            ModuleParams::new()
                .with("width", 1280)
                .with("height", 720)
                .with("position", "center"),
        ),
        ModuleSpec::new(
            "pad",
            ModuleParams::new()
                .with("width", 1920)
                .with("height", 1080)
                .with("position", "center")
                .with("color", "black"),
        ),
        ModuleSpec::new(
            "watermark",
            ModuleParams::new()
                .with("image_path", "assets/logo.png")
                .with("position", "bottomright")
                .with("opacity", 0.5)
                .with("scale", 0.2),
        ),
        ModuleSpec::new(
            "addvideo",
            ModuleParams::new()
                .with("video_path", "assets/overlay.mp4")
                .with("position", "topright")
                .with("scale", 0.3)
                .with("alpha", 0.8)
                .with("start_time", 2.0)
                .with("end_time", 12.0)
                .with("loop", true)
                .with("mute", true),
        ),
        ModuleSpec::new(
            "chromakey",
            ModuleParams::new()
                .with("overlay", "assets/greenscreen.mp4")
                .with("color", json!(["green"]))
                .with("similarity", json!([0.1]))
                .with("blend", json!([0.0]))
                .with("position", "center")
                .with("mute_overlay", true),
        ),
        ModuleSpec::new(
            "text_effects",
            ModuleParams::new()
                .with("text", "Hello")
                .with("font_size", 72)
                .with("color", "white")
                .with("position", "bottom")
                .with("effect", "fade")
                .with("effect_intensity", 5)
                .with("start_time", 1.0)
                .with("duration", 4.0),
        ),
        ModuleSpec::new("deleteaudio", ModuleParams::new()),
        ModuleSpec::new(
            "cut_video",
            ModuleParams::new().with("start", 0).with("duration", 10),
        ),
        ModuleSpec::new(
            "utility.cut",
            ModuleParams::new()
                .with("duration", 10)
                .with("output_dir", "parts")
                .with("prefix", "part_")
                .with("use_input_name", false),
        ),
        ModuleSpec::new(
            "utility.module_wrapper",
            ModuleParams::new()
                .with("module_name", "resize")
                .with("module_params", json!({"width": 640, "height": 360}))
                .with("custom_input", "assets/side.mp4")
                .with("custom_output", "side_small.mp4")
                .with("copy_to_pipeline", false),
        ),
        ModuleSpec::new("utility.prepareforyt", ModuleParams::new()),
    ];

    PipelineSpec::new("input.mp4", "output.mp4", modules)
}
