#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for tsdist
//!
//! Operations never print. They emit [`AppEvent`]s through an unbounded
//! channel and the CLI decides how to render and log them.

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{AppEvent, DistEvent, FailureContext, GeneralEvent, ProcessEvent, TypingsEvent};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Event plus the metadata captured when it was emitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    /// Wrap an event, deriving level and source from the event itself
    #[must_use]
    pub fn new(event: AppEvent) -> Self {
        let meta = EventMeta::new(event.level(), event.event_source());
        Self { meta, event }
    }
}

impl From<AppEvent> for EventMessage {
    fn from(event: AppEvent) -> Self {
        Self::new(event)
    }
}

/// Sending half of the event channel
pub type EventSender = UnboundedSender<EventMessage>;

/// Receiving half of the event channel
pub type EventReceiver = UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Single API for emitting events, whether holding a raw sender or a
/// context that owns one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Receiver may be gone (e.g. CLI shutting down)
            let _ = sender.send(EventMessage::new(event));
        }
    }

    /// Emit a user-visible progress line
    fn emit_progress(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::Progress {
            message: message.into(),
        }));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::Warning {
            message: message.into(),
            context: None,
        }));
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::DebugLog {
            message: message.into(),
            context: HashMap::new(),
        }));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
