//! Platform-specific operation errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Errors that can occur while touching processes or the filesystem
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("filesystem operation failed: {operation} - {message}")]
    FilesystemOperationFailed { operation: String, message: String },

    #[error("process execution failed: {command} - {message}")]
    ProcessExecutionFailed { command: String, message: String },

    #[error("command not found: {command}")]
    CommandNotFound { command: String },

    #[error("permission denied: {operation} - {message}")]
    PermissionDenied { operation: String, message: String },
}

impl UserFacingError for PlatformError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CommandNotFound { .. } => Some(
                "Install the tool (e.g. `npm install -g typescript typings`) or set its path under [tools].",
            ),
            Self::PermissionDenied { .. } => {
                Some("Check the permissions of the project directory.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::ProcessExecutionFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::FilesystemOperationFailed { .. } => "platform.filesystem_failed",
            Self::ProcessExecutionFailed { .. } => "platform.process_failed",
            Self::CommandNotFound { .. } => "platform.command_not_found",
            Self::PermissionDenied { .. } => "platform.permission_denied",
        })
    }
}
