//! Distribution build

use std::path::{Component, Path};
use std::time::Instant;
use tracing::info;
use tsdist_errors::{Error, OpsError};
use tsdist_events::{AppEvent, DistEvent, EventEmitter, FailureContext};
use tsdist_types::DistReport;

use crate::step::{command_failed, elapsed_ms, run_step};
use crate::typings::install_typings;
use crate::OpsCtx;

/// Options for [`build_dist`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DistOptions {
    /// Never install type definitions, even when the typings directory is missing
    pub skip_typings: bool,
}

/// Regenerate the distribution build.
///
/// Installs type definitions first when the typings directory is missing,
/// then clears the output directory and runs the compiler with declaration
/// emission.
///
/// # Errors
///
/// Returns an error if the output directory is unsafe to remove or cannot be
/// removed, if a tool cannot be started, or if a step fails while keep-going
/// is disabled.
pub async fn build_dist(ctx: &OpsCtx, options: DistOptions) -> Result<DistReport, Error> {
    let start = Instant::now();
    let platform_ctx = ctx.platform_context();
    let output_dir = ctx.config.dist_path();

    ctx.emit(AppEvent::Dist(DistEvent::Started {
        output_dir: output_dir.clone(),
    }));

    let typings_dir = ctx.config.typings_path();
    let typings = if options.skip_typings
        || ctx.platform.filesystem().is_dir(&platform_ctx, &typings_dir).await
    {
        None
    } else {
        ctx.emit(AppEvent::Dist(DistEvent::TypingsMissing {
            typings_dir: typings_dir.clone(),
        }));
        ctx.emit_progress("Install type definition files...");
        Some(install_typings(ctx).await?)
    };

    ctx.emit_progress("Updates JavaScript and Type Definition files...");

    ensure_removable(ctx, &ctx.config.project.root, &output_dir).await?;
    let removed_output = if ctx.check_mode {
        ctx.emit_progress(format!("would remove: {}", output_dir.display()));
        false
    } else {
        let existed = ctx
            .platform
            .filesystem()
            .remove_dir_all(&platform_ctx, &output_dir)
            .await?;
        ctx.emit(AppEvent::Dist(DistEvent::OutputRemoved {
            path: output_dir.clone(),
            existed,
        }));
        existed
    };

    let mut cmd = ctx.project_command(&ctx.config.tools.compiler);
    cmd.args(&ctx.config.tools.compiler_args);
    ctx.emit(AppEvent::Dist(DistEvent::CompileStarted {
        command: cmd.to_string(),
    }));

    let compile = match run_step(ctx, "compile", cmd).await {
        Ok(step) => step,
        Err(e) => {
            ctx.emit(AppEvent::Dist(DistEvent::CompileFailed {
                failure: FailureContext::from_error(&e),
            }));
            return Err(e);
        }
    };

    if compile.outcome.is_failure() {
        ctx.emit(AppEvent::Dist(DistEvent::CompileFailed {
            failure: FailureContext::from_error(&command_failed(&compile)),
        }));
    } else {
        ctx.emit(AppEvent::Dist(DistEvent::CompileCompleted {
            duration_ms: compile.duration_ms,
        }));
    }

    let report = DistReport {
        typings,
        output_dir,
        removed_output,
        compile,
        duration_ms: elapsed_ms(start),
    };

    ctx.emit(AppEvent::Dist(DistEvent::Completed {
        success: report.success(),
        duration_ms: report.duration_ms,
    }));
    info!(
        output_dir = %report.output_dir.display(),
        removed = report.removed_output,
        success = report.success(),
        "Distribution build finished"
    );

    Ok(report)
}

fn unsafe_output(output_dir: &Path, reason: impl Into<String>) -> OpsError {
    OpsError::UnsafeOutputDir {
        path: output_dir.display().to_string(),
        reason: reason.into(),
    }
}

/// The output directory must lie strictly below the project root.
async fn ensure_removable(ctx: &OpsCtx, root: &Path, output_dir: &Path) -> Result<(), Error> {
    check_nested(root, output_dir)?;

    // A symlinked output can still resolve outside the project
    let platform_ctx = ctx.platform_context();
    let fs = ctx.platform.filesystem();
    if fs.is_dir(&platform_ctx, output_dir).await {
        let root = fs.canonicalize(&platform_ctx, root).await?;
        let resolved = fs.canonicalize(&platform_ctx, output_dir).await?;
        if resolved == root {
            return Err(unsafe_output(output_dir, "it is the project root").into());
        }
        if !resolved.starts_with(&root) {
            return Err(unsafe_output(
                output_dir,
                format!("it resolves to {}, outside the project", resolved.display()),
            )
            .into());
        }
    }
    Ok(())
}

/// Path-level check: `output_dir` is `root` followed by plain directory names.
fn check_nested(root: &Path, output_dir: &Path) -> Result<(), OpsError> {
    let Ok(relative) = output_dir.strip_prefix(root) else {
        return Err(unsafe_output(output_dir, "it is outside the project root"));
    };

    let mut named = false;
    for component in relative.components() {
        match component {
            Component::Normal(_) => named = true,
            Component::CurDir => {}
            _ => return Err(unsafe_output(output_dir, "it escapes the project root")),
        }
    }
    if named {
        Ok(())
    } else {
        Err(unsafe_output(output_dir, "it is the project root"))
    }
}
