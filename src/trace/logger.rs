use std::{fs::OpenOptions, io::Write, path::Path, sync::Mutex};

use crate::trace::trace::TraceEvent;

/// Appends [`TraceEvent`]s to a JSONL file. Never fails the caller.
pub struct TraceLogger {
    file: Option<Mutex<std::fs::File>>,
}

impl TraceLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path);

        match file {
            Ok(f) => Self {
                file: Some(Mutex::new(f)),
            },
            Err(e) => {
                tracing::warn!("could not open trace file '{}': {}", path.display(), e);
                Self { file: None }
            }
        }
    }

    pub fn disabled() -> Self {
        Self { file: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    pub fn log(&self, event: &TraceEvent) {
        let file_mutex = match &self.file {
            Some(f) => f,
            None => return, // tracing disabled
        };

        let json = match serde_json::to_string(event) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!("failed to serialize trace event: {}", e);
                return;
            }
        };

        let mut file = match file_mutex.lock() {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("trace logger lock poisoned: {}", e);
                return;
            }
        };

        if let Err(e) = writeln!(file, "{}", json) {
            tracing::warn!("failed to write trace event: {}", e);
        }
    }
}
