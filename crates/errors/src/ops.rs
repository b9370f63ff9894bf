//! Operation orchestration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum OpsError {
    #[error("component not found: {component}")]
    MissingComponent { component: String },

    #[error("command `{command}` exited with {}", exit_label(*.exit_code))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
    },

    #[error("{failed} of {total} steps failed")]
    StepsFailed { failed: usize, total: usize },

    #[error("refusing to remove {path}: {reason}")]
    UnsafeOutputDir { path: String, reason: String },

    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl UserFacingError for OpsError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CommandFailed { .. } => {
                Some("Inspect the tool output above, or pass --keep-going to run the remaining steps.")
            }
            Self::UnsafeOutputDir { .. } => {
                Some("Point [project].dist_dir at a relative subdirectory of the project.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::MissingComponent { .. } => "ops.missing_component",
            Self::CommandFailed { .. } => "ops.command_failed",
            Self::StepsFailed { .. } => "ops.steps_failed",
            Self::UnsafeOutputDir { .. } => "ops.unsafe_output_dir",
            Self::SerializationError { .. } => "ops.serialization",
        })
    }
}
