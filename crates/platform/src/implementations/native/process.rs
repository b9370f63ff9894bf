//! Native process operations implementation

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;
use tsdist_errors::{Error, PlatformError};
use tsdist_events::{AppEvent, EventEmitter, ProcessEvent};

use crate::core::PlatformContext;
use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};

/// Process operations backed by `tokio::process`
pub struct NativeProcessOperations;

impl NativeProcessOperations {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for NativeProcessOperations {
    fn default() -> Self {
        Self::new()
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn spawn_error(cmd: &PlatformCommand, err: &std::io::Error) -> PlatformError {
    match err.kind() {
        std::io::ErrorKind::NotFound => PlatformError::CommandNotFound {
            command: cmd.program().to_string(),
        },
        std::io::ErrorKind::PermissionDenied => PlatformError::PermissionDenied {
            operation: format!("execute {}", cmd.program()),
            message: err.to_string(),
        },
        _ => PlatformError::ProcessExecutionFailed {
            command: cmd.program().to_string(),
            message: err.to_string(),
        },
    }
}

#[async_trait]
impl ProcessOperations for NativeProcessOperations {
    async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, Error> {
        let start = Instant::now();
        debug!("Executing: {cmd}");

        ctx.emit(AppEvent::Process(ProcessEvent::ExecutionStarted {
            command: cmd.program().to_string(),
            args: cmd.get_args().to_vec(),
            working_dir: cmd.get_current_dir().cloned(),
        }));

        let mut command = Command::new(cmd.program());
        command.args(cmd.get_args()).stdin(Stdio::null());

        if let Some(dir) = cmd.get_current_dir() {
            command.current_dir(dir);
        }

        let result: Result<CommandOutput, PlatformError> = if cmd.captures_output() {
            command
                .output()
                .await
                .map(|output| CommandOutput {
                    exit_code: output.status.code(),
                    stdout: output.stdout,
                    stderr: output.stderr,
                })
                .map_err(|e| spawn_error(&cmd, &e))
        } else {
            command
                .status()
                .await
                .map(|status| CommandOutput {
                    exit_code: status.code(),
                    ..CommandOutput::default()
                })
                .map_err(|e| spawn_error(&cmd, &e))
        };

        let duration_ms = duration_to_millis(start.elapsed());

        match &result {
            Ok(output) => {
                ctx.emit(AppEvent::Process(ProcessEvent::ExecutionCompleted {
                    command: cmd.program().to_string(),
                    exit_code: output.exit_code,
                    success: output.success(),
                    duration_ms,
                }));
            }
            Err(e) => {
                ctx.emit(AppEvent::Process(ProcessEvent::ExecutionFailed {
                    command: cmd.program().to_string(),
                    error_message: e.to_string(),
                    duration_ms,
                }));
            }
        }

        result.map_err(Error::from)
    }

    async fn which(&self, program: &str) -> Result<PathBuf, Error> {
        which::which(program).map_err(|e| {
            debug!("{program} not resolvable: {e}");
            PlatformError::CommandNotFound {
                command: program.to_string(),
            }
            .into()
        })
    }
}
