use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Distribution build events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DistEvent {
    Started { output_dir: PathBuf },

    /// Typings directory is absent so definitions get installed first
    TypingsMissing { typings_dir: PathBuf },

    OutputRemoved { path: PathBuf, existed: bool },

    CompileStarted { command: String },

    CompileCompleted { duration_ms: u64 },

    CompileFailed { failure: FailureContext },

    Completed { success: bool, duration_ms: u64 },
}
