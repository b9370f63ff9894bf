//! Event handling and progress display

use console::Style;
use tsdist_events::{AppEvent, DistEvent, EventMessage, GeneralEvent, TypingsEvent};

use crate::logging::log_event_with_tracing;

/// Event handler for progress display and user feedback
pub struct EventHandler {
    colors_enabled: bool,
    /// Keep stdout free for the JSON document
    json_mode: bool,
    debug_enabled: bool,
}

impl EventHandler {
    /// Create new event handler
    pub fn new(colors_enabled: bool, json_mode: bool, debug_enabled: bool) -> Self {
        Self {
            colors_enabled,
            json_mode,
            debug_enabled,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        log_event_with_tracing(&message);

        if let Some(line) = self.status_line(&message.event) {
            self.show_status(&line);
        }

        match &message.event {
            AppEvent::General(GeneralEvent::Warning { message, context }) => {
                let text = match context {
                    Some(context) => format!("warning: {message} ({context})"),
                    None => format!("warning: {message}"),
                };
                self.show_error(&self.style(Style::new().yellow(), &text));
            }
            AppEvent::Typings(TypingsEvent::EntryFailed { name, failure }) => {
                let text = format!("failed to install {name}: {}", failure.message);
                self.show_error(&self.style(Style::new().red(), &text));
            }
            AppEvent::Dist(DistEvent::CompileFailed { failure }) => {
                let text = format!("compilation failed: {}", failure.message);
                self.show_error(&self.style(Style::new().red(), &text));
            }
            AppEvent::General(GeneralEvent::DebugLog { message, .. }) if self.debug_enabled => {
                self.show_error(&self.style(Style::new().dim(), message));
            }
            _ => {}
        }
    }

    /// Line printed on stdout for this event, if any
    fn status_line(&self, event: &AppEvent) -> Option<String> {
        if self.json_mode {
            return None;
        }

        match event {
            AppEvent::General(GeneralEvent::Progress { message }) => Some(message.clone()),
            AppEvent::Typings(TypingsEvent::EntryStarted { name, global, .. }) => {
                let scope = if *global { " (global)" } else { "" };
                Some(self.style(Style::new().dim(), &format!("  {name}{scope}")))
            }
            AppEvent::Dist(DistEvent::OutputRemoved { path, existed: true }) => Some(self.style(
                Style::new().dim(),
                &format!("  removed {}", path.display()),
            )),
            AppEvent::Dist(DistEvent::CompileStarted { command }) => {
                Some(self.style(Style::new().dim(), &format!("  {command}")))
            }
            _ => None,
        }
    }

    fn style(&self, style: Style, text: &str) -> String {
        if self.colors_enabled {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Show status message
    fn show_status(&self, message: &str) {
        println!("{message}");
    }

    /// Show error or diagnostic message
    fn show_error(&self, message: &str) {
        eprintln!("{message}");
    }
}
