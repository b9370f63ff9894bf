//! Running a single external step under the configured failure policy

use std::time::Instant;
use tracing::{debug, warn};
use tsdist_errors::{Error, OpsError};
use tsdist_events::{AppEvent, EventEmitter, ProcessEvent};
use tsdist_platform::PlatformCommand;
use tsdist_types::{StepOutcome, StepReport};

use crate::OpsCtx;

pub(crate) fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Run `cmd` and record it as `step`.
///
/// A non-zero exit aborts with [`OpsError::CommandFailed`] unless keep-going
/// is enabled, in which case it is recorded as a failed step. Failing to start
/// the process always aborts.
pub(crate) async fn run_step(
    ctx: &OpsCtx,
    step: impl Into<String>,
    cmd: PlatformCommand,
) -> Result<StepReport, Error> {
    let step = step.into();
    let mut report = StepReport {
        step,
        program: cmd.program().to_string(),
        args: cmd.get_args().to_vec(),
        outcome: StepOutcome::Skipped,
        duration_ms: 0,
    };

    if ctx.check_mode {
        plan_step(ctx, &cmd).await;
        return Ok(report);
    }

    let start = Instant::now();
    let output = ctx
        .platform
        .process()
        .execute_command(&ctx.platform_context(), cmd)
        .await?;
    report.duration_ms = elapsed_ms(start);

    if output.success() {
        report.outcome = StepOutcome::Succeeded;
        return Ok(report);
    }

    report.outcome = StepOutcome::Failed {
        exit_code: output.exit_code,
    };
    if !output.stderr.is_empty() {
        ctx.emit_debug(format!(
            "{} stderr:\n{}",
            report.step,
            String::from_utf8_lossy(&output.stderr).trim_end()
        ));
    }
    let error = command_failed(&report);
    if ctx.keep_going() {
        warn!("{error}; continuing");
        Ok(report)
    } else {
        Err(error.into())
    }
}

/// Error describing a failed step
pub(crate) fn command_failed(report: &StepReport) -> OpsError {
    let exit_code = match report.outcome {
        StepOutcome::Failed { exit_code } => exit_code,
        _ => None,
    };
    OpsError::CommandFailed {
        command: report.command_line(),
        exit_code,
    }
}

async fn plan_step(ctx: &OpsCtx, cmd: &PlatformCommand) {
    debug!("Check mode, not running: {cmd}");
    ctx.emit(AppEvent::Process(ProcessEvent::ExecutionPlanned {
        command: cmd.program().to_string(),
        args: cmd.get_args().to_vec(),
    }));
    ctx.emit_progress(format!("would run: {cmd}"));

    if ctx.platform.process().which(cmd.program()).await.is_err() {
        ctx.emit_warning(format!("{} was not found on PATH", cmd.program()));
    }
}
