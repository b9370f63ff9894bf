//! Type-definition installation

use std::time::Instant;
use tracing::info;
use tsdist_errors::Error;
use tsdist_events::{AppEvent, EventEmitter, FailureContext, TypingsEvent};
use tsdist_types::TypingsReport;

use crate::step::{command_failed, elapsed_ms, run_step};
use crate::OpsCtx;

/// Install every configured type definition, in table order.
///
/// Each entry runs `<installer> install <source> [--global]` once.
///
/// # Errors
///
/// Returns an error if the installer cannot be started, or if it exits
/// non-zero while keep-going is disabled.
pub async fn install_typings(ctx: &OpsCtx) -> Result<TypingsReport, Error> {
    let start = Instant::now();
    let definitions = ctx.config.type_definitions();

    ctx.emit_progress("Installing type definition files...");
    ctx.emit(AppEvent::Typings(TypingsEvent::Started {
        count: definitions.len(),
    }));

    let mut report = TypingsReport::default();
    for definition in &definitions {
        ctx.emit(AppEvent::Typings(TypingsEvent::EntryStarted {
            name: definition.name.clone(),
            source: definition.source.clone(),
            global: definition.global,
        }));

        let mut cmd = ctx.project_command(&ctx.config.tools.installer);
        cmd.args(definition.install_args());

        let step = match run_step(ctx, format!("install {}", definition.name), cmd).await {
            Ok(step) => step,
            Err(e) => {
                ctx.emit(AppEvent::Typings(TypingsEvent::EntryFailed {
                    name: definition.name.clone(),
                    failure: FailureContext::from_error(&e),
                }));
                return Err(e);
            }
        };

        if step.outcome.is_failure() {
            ctx.emit(AppEvent::Typings(TypingsEvent::EntryFailed {
                name: definition.name.clone(),
                failure: FailureContext::from_error(&command_failed(&step)),
            }));
        } else {
            ctx.emit(AppEvent::Typings(TypingsEvent::EntryCompleted {
                name: definition.name.clone(),
                duration_ms: step.duration_ms,
            }));
        }
        report.steps.push(step);
    }

    report.duration_ms = elapsed_ms(start);
    let failed = report.failed_steps();
    ctx.emit(AppEvent::Typings(TypingsEvent::Completed {
        installed: report.steps.len() - failed,
        failed,
    }));
    info!(
        definitions = report.steps.len(),
        failed, "Type definition install finished"
    );

    Ok(report)
}
