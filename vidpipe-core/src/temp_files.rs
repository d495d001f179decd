//! Temporary file management for pipeline runs.
//!
//! Every run gets a private directory holding the intermediate stage files.
//! The directory is created through the tempfile crate (unique name, created
//! atomically) but its removal is explicit: intermediates must survive a
//! failed run for inspection, and failed deletions are reported rather than
//! silently ignored.

use crate::error::CoreResult;
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::Builder as TempFileBuilder;

/// Prefix of run directory names.
pub const RUN_DIR_PREFIX: &str = ".vidpipe_run_";

/// Random six-character run identifier used in log tags.
pub fn generate_run_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

/// Private directory of one pipeline run.
#[derive(Debug)]
pub struct RunDirectory {
    path: PathBuf,
    extension: String,
}

impl RunDirectory {
    /// Creates `<base>/.vidpipe_run_<run_id>_XXXXXX`.
    pub fn create(base: &Path, run_id: &str, extension: &str) -> CoreResult<Self> {
        std::fs::create_dir_all(base)?;
        let dir = TempFileBuilder::new()
            .prefix(&format!("{RUN_DIR_PREFIX}{run_id}_"))
            .tempdir_in(base)?;

        Ok(Self {
            path: dir.into_path(),
            extension: extension.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Intermediate output of stage `index`, e.g. `stage_000.mp4`.
    pub fn stage_path(&self, index: usize) -> PathBuf {
        self.path.join(format!("stage_{index:03}.{}", self.extension))
    }

    /// Removes the given files and then the directory itself.
    ///
    /// Returns every path that could not be removed with the reason. A file
    /// that is already gone is not an error.
    pub fn cleanup(&self, files: &[PathBuf]) -> Vec<(PathBuf, io::Error)> {
        let mut failures = Vec::new();
        for file in files {
            match std::fs::remove_file(file) {
                Ok(()) => log::debug!("Removed intermediate file {}", file.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    log::warn!("Failed to remove intermediate file {}: {}", file.display(), e);
                    failures.push((file.clone(), e));
                }
            }
        }
        if let Err(e) = std::fs::remove_dir(&self.path) {
            log::warn!("Failed to remove run directory {}: {}", self.path.display(), e);
            failures.push((self.path.clone(), e));
        }
        failures
    }
}
