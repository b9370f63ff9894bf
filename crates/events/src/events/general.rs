use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// General utility events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeneralEvent {
    /// Literal progress line shown to the user
    Progress { message: String },

    /// Generic warning message with optional context
    Warning {
        message: String,
        context: Option<String>,
    },

    /// Debug logging with structured context
    DebugLog {
        message: String,
        context: HashMap<String, String>,
    },
}
