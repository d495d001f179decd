//! Pipeline progress events.
//!
//! The pipeline reports what it is doing through [`Event`]s delivered to
//! every registered [`EventHandler`]. Handlers decide how to present them
//! (progress bars, JSON lines); the same information is also written to the
//! `log` facade by the pipeline itself.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub mod json_handler;

pub use json_handler::JsonProgressHandler;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PipelineStarted {
        run_id: String,
        input: PathBuf,
        output: PathBuf,
        stages: usize,
    },

    /// A pipeline entry was matched to a module kind.
    ModuleResolved {
        index: usize,
        name: String,
        key: String,
    },

    StageStarted {
        run_id: String,
        stage: usize,
        total: usize,
        module: String,
        input: PathBuf,
        output: PathBuf,
    },

    StageCompleted {
        run_id: String,
        stage: usize,
        total: usize,
        module: String,
        elapsed: Duration,
    },

    StageFailed {
        run_id: String,
        stage: usize,
        total: usize,
        module: String,
        message: String,
    },

    /// An intermediate file could not be removed. Never fatal.
    CleanupFailed { path: PathBuf, message: String },

    PipelineCompleted {
        run_id: String,
        output: PathBuf,
        elapsed: Duration,
    },
}

pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &Event);
}

pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn has_handlers(&self) -> bool {
        !self.handlers.is_empty()
    }

    pub fn emit(&self, event: Event) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Event>>);

    impl EventHandler for Recorder {
        fn handle(&self, event: &Event) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn every_handler_sees_every_event() {
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        let mut dispatcher = EventDispatcher::new();
        assert!(!dispatcher.has_handlers());
        dispatcher.add_handler(first.clone());
        dispatcher.add_handler(second.clone());

        dispatcher.emit(Event::CleanupFailed {
            path: PathBuf::from("/tmp/x"),
            message: "busy".to_string(),
        });

        assert_eq!(first.0.lock().unwrap().len(), 1);
        assert_eq!(*first.0.lock().unwrap(), *second.0.lock().unwrap());
    }
}
