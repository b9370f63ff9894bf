#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for tsdist
//!
//! Errors are split by domain and wrapped by [`Error`] at crate boundaries.
//! Every type is `Clone` so reports and events can carry them around.

use std::borrow::Cow;

use thiserror::Error;

pub mod config;
pub mod ops;
pub mod platform;

pub use config::ConfigError;
pub use ops::OpsError;
pub use platform::PlatformError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("ops error: {0}")]
    Ops(#[from] OpsError),

    #[error("I/O error: {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
        path: Option<std::path::PathBuf>,
    },
}

impl Error {
    /// Create an Io error with an associated path
    pub fn io_with_path(err: &std::io::Error, path: impl Into<std::path::PathBuf>) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: Some(path.into()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(ConfigError::ParseError {
            message: err.to_string(),
        })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Ops(OpsError::SerializationError {
            message: err.to_string(),
        })
    }
}

/// Result type alias for tsdist operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Config(err) => err.user_message(),
            Error::Platform(err) => err.user_message(),
            Error::Ops(err) => err.user_message(),
            Error::Io {
                message,
                path: Some(path),
                ..
            } => Cow::Owned(format!("{message} ({})", path.display())),
            Error::Io { message, .. } => Cow::Borrowed(message),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Config(err) => err.user_hint(),
            Error::Platform(err) => err.user_hint(),
            Error::Ops(err) => err.user_hint(),
            Error::Io { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Platform(err) => err.is_retryable(),
            Error::Ops(err) => err.is_retryable(),
            Error::Io { .. } => true,
            Error::Config(_) => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Config(err) => err.user_code(),
            Error::Platform(err) => err.user_code(),
            Error::Ops(err) => err.user_code(),
            Error::Io { .. } => Some("error.io"),
        }
    }
}
