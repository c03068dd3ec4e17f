use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Materialized { run_dir: PathBuf },
    Launching { index: usize, total: usize, command: String },
    Finished { index: usize, total: usize, run_dir: PathBuf },
}

pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

#[derive(Debug, Default)]
pub struct StdoutProgressSink;

impl ProgressSink for StdoutProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Materialized { run_dir } => println!("[runset] created {}", run_dir.display()),
            ProgressEvent::Launching { index, total, command } => {
                println!("[launch {}/{total}] {command}", index + 1);
            }
            ProgressEvent::Finished { index, total, run_dir } => {
                println!("[launch {}/{total}] finished {}", index + 1, run_dir.display());
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn on_event(&self, _event: ProgressEvent) {}
}
