//! tsdist - installs type definitions and regenerates the dist build of a
//! TypeScript library

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use std::process;
use tracing::{error, info};
use tsdist_config::Config;
use tsdist_errors::OpsError;
use tsdist_events::EventReceiver;
use tsdist_ops::{DistOptions, OperationResult, OpsContextBuilder, OpsCtx};
use tsdist_platform::Platform;
use tsdist_types::{ColorChoice, OutputFormat};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Main application logic
///
/// Tracing starts once file, environment and flags are merged so debug logs
/// land under the resolved project root.
async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = Config::load_or_default(cli.global.config.as_deref())
        .await
        .map_err(CliError::Config)?;
    config.merge_env().map_err(CliError::Config)?;
    apply_cli_config(&mut config, &cli.global);

    logging::init_tracing(cli.global.json, cli.global.debug, &config.project.root);
    info!("Starting tsdist v{}", env!("CARGO_PKG_VERSION"));

    config.validate().map_err(CliError::Config)?;

    let format = if cli.global.json {
        OutputFormat::Json
    } else {
        config.general.default_output
    };
    let json_output = format == OutputFormat::Json;
    let colors_enabled = match config.general.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stdout().features().colors_supported(),
    };

    let (event_tx, event_rx) = tsdist_events::channel();

    let ctx = OpsContextBuilder::new()
        .with_platform(Platform::native())
        .with_event_sender(event_tx)
        .with_config(config)
        .with_check_mode(cli.global.check)
        .with_capture_output(json_output)
        .build()?;

    let mut event_handler = EventHandler::new(colors_enabled, json_output, cli.global.debug);

    let result =
        execute_command_with_events(cli.command, ctx, event_rx, &mut event_handler).await?;

    OutputRenderer::new(format, colors_enabled).render_result(&result)?;

    if !result.is_success() {
        return Err(OpsError::StepsFailed {
            failed: result.failed_steps(),
            total: result.total_steps(),
        }
        .into());
    }

    info!("Command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    ctx: OpsCtx,
    mut event_rx: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let command_future = execute_command(command, ctx);
    tokio::pin!(command_future);
    let mut events_open = true;

    loop {
        tokio::select! {
            result = &mut command_future => {
                // Drain what the command emitted before it returned
                while let Ok(message) = event_rx.try_recv() {
                    event_handler.handle_event(message);
                }
                return result;
            }

            message = event_rx.recv(), if events_open => {
                match message {
                    Some(message) => event_handler.handle_event(message),
                    None => events_open = false,
                }
            }
        }
    }
}

/// Execute the specific command
async fn execute_command(command: Commands, ctx: OpsCtx) -> Result<OperationResult, CliError> {
    match command {
        Commands::Typings => {
            let report = tsdist_ops::install_typings(&ctx).await?;
            Ok(OperationResult::TypingsReport(report))
        }
        Commands::Dist { skip_typings } => {
            let report = tsdist_ops::build_dist(&ctx, DistOptions { skip_typings }).await?;
            Ok(OperationResult::DistReport(report))
        }
        Commands::List => Ok(OperationResult::Definitions(tsdist_ops::list_definitions(
            &ctx,
        ))),
    }
}

/// Apply CLI flags on top of file and environment configuration
fn apply_cli_config(config: &mut Config, global: &GlobalArgs) {
    if let Some(color) = global.color {
        config.general.color = color;
    }
    if global.keep_going {
        config.general.keep_going = true;
    }
    if let Some(root) = &global.project_root {
        config.project.root.clone_from(root);
    }
}
