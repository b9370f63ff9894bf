//! CLI error handling

use std::fmt;

use tsdist_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid
    Config(tsdist_errors::Error),
    /// Operations error
    Ops(tsdist_errors::Error),
    /// I/O error while rendering output
    Io(std::io::Error),
}

fn write_user_facing(f: &mut fmt::Formatter<'_>, e: &tsdist_errors::Error) -> fmt::Result {
    write!(f, "{}", e.user_message())?;
    if let Some(code) = e.user_code() {
        write!(f, "\n  Code: {code}")?;
    }
    if let Some(hint) = e.user_hint() {
        write!(f, "\n  Hint: {hint}")?;
    }
    if e.is_retryable() {
        write!(f, "\n  Retry: safe to retry this operation.")?;
    }
    Ok(())
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => {
                write!(f, "Configuration error: ")?;
                write_user_facing(f, e)
            }
            CliError::Ops(e) => write_user_facing(f, e),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) | CliError::Ops(e) => Some(e),
            CliError::Io(e) => Some(e),
        }
    }
}

impl From<tsdist_errors::Error> for CliError {
    fn from(e: tsdist_errors::Error) -> Self {
        CliError::Ops(e)
    }
}

impl From<tsdist_errors::OpsError> for CliError {
    fn from(e: tsdist_errors::OpsError) -> Self {
        CliError::Ops(e.into())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
