//! Core library for declarative video transformation pipelines driven by ffmpeg.
//!
//! A pipeline is an input file, an output file and an ordered list of
//! transform modules (crop, pad, resize, watermark, overlays, text, ...).
//! Each module is configured from a parameter mapping, validated up front,
//! and run as one ffmpeg invocation whose output feeds the next stage.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use vidpipe_core::config::PipelineSettingsBuilder;
//! use vidpipe_core::external::{CrateFfprobeExecutor, SidecarSpawner};
//! use vidpipe_core::{Pipeline, PipelineSpec};
//! use std::path::Path;
//!
//! let spec = PipelineSpec::from_file(Path::new("pipeline.yaml")).unwrap();
//! let mut pipeline = Pipeline::new(spec, PipelineSettingsBuilder::new().build());
//!
//! let report = pipeline
//!     .process(&SidecarSpawner, &CrateFfprobeExecutor::new(), None, None)
//!     .unwrap();
//! println!("wrote {}", report.output.display());
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod external;
pub mod geometry;
pub mod graph;
pub mod modules;
pub mod pipeline;
pub mod registry;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use config::{ModuleParams, ModuleSpec, PipelineSettings, PipelineSpec, sample_pipeline};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use events::{Event, EventDispatcher, EventHandler};
pub use external::check_dependency;
pub use modules::{StageContext, TransformModule};
pub use pipeline::{Pipeline, PipelineReport, PipelineState, StageReport};
pub use registry::ModuleKind;
pub use utils::{file_size, format_bytes, format_duration};
