use serde::{Deserialize, Serialize};

use crate::{EventLevel, EventSource};
use tsdist_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    pub retryable: bool,
}

impl FailureContext {
    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self {
            code: error.user_code().map(Into::into),
            message: error.user_message().into_owned(),
            hint: error.user_hint().map(Into::into),
            retryable: error.is_retryable(),
        }
    }
}

pub mod dist;
pub mod general;
pub mod process;
pub mod typings;

pub use dist::DistEvent;
pub use general::GeneralEvent;
pub use process::ProcessEvent;
pub use typings::TypingsEvent;

/// Top-level application event enum that aggregates all domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Progress lines, warnings and debug output
    General(GeneralEvent),

    /// Type-definition installation
    Typings(TypingsEvent),

    /// Distribution build
    Dist(DistEvent),

    /// External process execution
    Process(ProcessEvent),
}

impl AppEvent {
    /// Identify the source domain for this event.
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::General,
            Self::Typings(_) => EventSource::Typings,
            Self::Dist(_) => EventSource::Dist,
            Self::Process(_) => EventSource::Process,
        }
    }

    /// Default severity used when the event is logged.
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::General(GeneralEvent::Warning { .. }) => EventLevel::Warn,
            Self::General(GeneralEvent::DebugLog { .. }) => EventLevel::Debug,
            Self::Typings(TypingsEvent::EntryFailed { .. })
            | Self::Dist(DistEvent::CompileFailed { .. })
            | Self::Process(ProcessEvent::ExecutionFailed { .. }) => EventLevel::Error,
            Self::Process(ProcessEvent::ExecutionCompleted { success: false, .. }) => {
                EventLevel::Warn
            }
            Self::Process(_) => EventLevel::Debug,
            _ => EventLevel::Info,
        }
    }
}
