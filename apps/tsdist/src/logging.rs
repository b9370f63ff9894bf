//! Tracing setup and structured logging of application events

use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use tsdist_config::constants::LOGS_DIR;
use tsdist_events::{AppEvent, DistEvent, EventLevel, EventMessage, ProcessEvent, TypingsEvent};

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Initialize tracing/logging
///
/// Normal mode logs warnings to stderr. `--debug` (or `RUST_LOG`) writes JSON
/// logs under the project's log directory. JSON output mode never logs to the
/// console so stdout stays machine-readable.
pub fn init_tracing(json_mode: bool, debug_enabled_flag: bool, project_root: &Path) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if debug_enabled {
        let log_dir = project_root.join(LOGS_DIR);
        let log_file = log_dir.join(format!(
            "tsdist-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        let file =
            std::fs::create_dir_all(&log_dir).and_then(|()| std::fs::File::create(&log_file));
        match file {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_env_filter(env_filter("info,tsdist=debug,tsdist_ops=debug"))
                    .init();
                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) if !json_mode => {
                eprintln!("Warning: Failed to create log file: {e}");
            }
            Err(_) => {}
        }
    }

    if json_mode {
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter("warn,tsdist=warn,tsdist_ops=warn"))
            .init();
    }
}

/// Log an event with structured fields at the level recorded in its metadata
pub fn log_event_with_tracing(message: &EventMessage) {
    let event = &message.event;
    let meta = &message.meta;

    match event {
        AppEvent::Typings(TypingsEvent::EntryStarted {
            name,
            source,
            global,
        }) => {
            info!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                definition = %name,
                definition_source = %source,
                global = global,
                "Installing type definition"
            );
        }
        AppEvent::Typings(TypingsEvent::EntryFailed { name, failure }) => {
            error!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                definition = %name,
                code = ?failure.code,
                message = %failure.message,
                "Type definition install failed"
            );
        }
        AppEvent::Dist(DistEvent::CompileFailed { failure }) => {
            error!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                code = ?failure.code,
                message = %failure.message,
                "Compilation failed"
            );
        }
        AppEvent::Dist(DistEvent::OutputRemoved { path, existed }) => {
            debug!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                path = %path.display(),
                existed = existed,
                "Output directory cleared"
            );
        }
        AppEvent::Process(ProcessEvent::ExecutionCompleted {
            command,
            exit_code,
            success,
            duration_ms,
        }) => {
            let success = *success;
            if success {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    command = %command,
                    exit_code = ?exit_code,
                    duration_ms = duration_ms,
                    "Process finished"
                );
            } else {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    command = %command,
                    exit_code = ?exit_code,
                    duration_ms = duration_ms,
                    "Process exited unsuccessfully"
                );
            }
        }
        AppEvent::Process(ProcessEvent::ExecutionFailed {
            command,
            error_message,
            duration_ms,
        }) => {
            error!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                command = %command,
                error = %error_message,
                duration_ms = duration_ms,
                "Process could not be started"
            );
        }
        _ => match meta.level {
            EventLevel::Error => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    event = ?event,
                    "Application event"
                );
            }
            EventLevel::Warn => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    event = ?event,
                    "Application event"
                );
            }
            EventLevel::Info => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    event = ?event,
                    "Application event"
                );
            }
            EventLevel::Debug => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    event = ?event,
                    "Application event"
                );
            }
        },
    }
}
