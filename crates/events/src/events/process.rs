use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// External process execution events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcessEvent {
    ExecutionStarted {
        command: String,
        args: Vec<String>,
        working_dir: Option<PathBuf>,
    },

    /// Process ran to completion; `success` reflects its exit status
    ExecutionCompleted {
        command: String,
        exit_code: Option<i32>,
        success: bool,
        duration_ms: u64,
    },

    /// Process could not be started at all
    ExecutionFailed {
        command: String,
        error_message: String,
        duration_ms: u64,
    },

    /// Check mode: the command that would have run
    ExecutionPlanned { command: String, args: Vec<String> },
}
