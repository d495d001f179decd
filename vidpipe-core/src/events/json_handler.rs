//! JSON progress handler for structured progress output
//!
//! Writes one JSON object per pipeline event, for consumption by scripts
//! wrapping the CLI.

use super::{Event, EventHandler};
use serde_json::json;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Event handler that outputs pipeline events as JSON lines
pub struct JsonProgressHandler {
    output: Mutex<Box<dyn Write + Send>>,
}

impl JsonProgressHandler {
    /// Create a new JSON progress handler that writes to stdout
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    /// Create a new JSON progress handler with a custom writer
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            output: Mutex::new(writer),
        }
    }

    /// Get current timestamp as seconds since Unix epoch
    fn get_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn write_json(&self, value: serde_json::Value) {
        if let Ok(mut output) = self.output.lock() {
            if let Ok(json_str) = serde_json::to_string(&value) {
                let _ = writeln!(output, "{}", json_str);
                let _ = output.flush();
            }
        }
    }

    fn to_json(event: &Event) -> serde_json::Value {
        match event {
            Event::PipelineStarted {
                run_id,
                input,
                output,
                stages,
            } => json!({
                "type": "pipeline_started",
                "run_id": run_id,
                "input": input.display().to_string(),
                "output": output.display().to_string(),
                "stages": stages,
            }),

            Event::ModuleResolved { index, name, key } => json!({
                "type": "module_resolved",
                "index": index,
                "name": name,
                "module": key,
            }),

            Event::StageStarted {
                run_id,
                stage,
                total,
                module,
                input,
                output,
            } => json!({
                "type": "stage_started",
                "run_id": run_id,
                "stage": stage + 1,
                "total": total,
                "module": module,
                "input": input.display().to_string(),
                "output": output.display().to_string(),
            }),

            Event::StageCompleted {
                run_id,
                stage,
                total,
                module,
                elapsed,
            } => json!({
                "type": "stage_completed",
                "run_id": run_id,
                "stage": stage + 1,
                "total": total,
                "module": module,
                "elapsed_seconds": elapsed.as_secs_f64(),
                "percent": (*stage + 1) as f64 / (*total).max(1) as f64 * 100.0,
            }),

            Event::StageFailed {
                run_id,
                stage,
                total,
                module,
                message,
            } => json!({
                "type": "stage_failed",
                "run_id": run_id,
                "stage": stage + 1,
                "total": total,
                "module": module,
                "message": message,
            }),

            Event::CleanupFailed { path, message } => json!({
                "type": "cleanup_failed",
                "path": path.display().to_string(),
                "message": message,
            }),

            Event::PipelineCompleted {
                run_id,
                output,
                elapsed,
            } => json!({
                "type": "pipeline_completed",
                "run_id": run_id,
                "output": output.display().to_string(),
                "elapsed_seconds": elapsed.as_secs_f64(),
            }),
        }
    }
}

impl EventHandler for JsonProgressHandler {
    fn handle(&self, event: &Event) {
        let mut value = Self::to_json(event);
        value["timestamp"] = json!(Self::get_timestamp());
        self.write_json(value);
    }
}

impl Default for JsonProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
