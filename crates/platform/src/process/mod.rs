//! Process execution operations

use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use tsdist_errors::Error;

use crate::core::PlatformContext;

/// Platform-specific command builder and execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    capture_output: bool,
}

impl PlatformCommand {
    /// Create a new platform command
    #[must_use]
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            current_dir: None,
            capture_output: false,
        }
    }

    /// Add an argument to the command
    pub fn arg<S: AsRef<str>>(&mut self, arg: S) -> &mut Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments to the command
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Set the working directory for the command
    pub fn current_dir<P: Into<PathBuf>>(&mut self, dir: P) -> &mut Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Capture stdout/stderr instead of letting the child write to the terminal
    pub fn capture_output(&mut self, capture: bool) -> &mut Self {
        self.capture_output = capture;
        self
    }

    /// Get the program name
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Get the arguments
    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the current directory
    #[must_use]
    pub fn get_current_dir(&self) -> Option<&PathBuf> {
        self.current_dir.as_ref()
    }

    #[must_use]
    pub fn captures_output(&self) -> bool {
        self.capture_output
    }
}

impl fmt::Display for PlatformCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Output from command execution
///
/// `stdout`/`stderr` stay empty unless the command asked for capture.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Trait for process execution operations
#[async_trait]
pub trait ProcessOperations: Send + Sync {
    /// Execute a command and wait for it to finish.
    ///
    /// A non-zero exit is reported through [`CommandOutput`]; only failing to
    /// start the process is an error.
    async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, Error>;

    /// Find the path to an executable
    async fn which(&self, program: &str) -> Result<PathBuf, Error>;
}
