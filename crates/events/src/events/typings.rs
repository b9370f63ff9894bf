use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Type-definition installation events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypingsEvent {
    /// Installation of the whole table started
    Started { count: usize },

    /// One definition is about to be installed
    EntryStarted {
        name: String,
        source: String,
        global: bool,
    },

    EntryCompleted { name: String, duration_ms: u64 },

    EntryFailed {
        name: String,
        failure: FailureContext,
    },

    /// Table finished (possibly with failures in keep-going mode)
    Completed { installed: usize, failed: usize },
}
