//! Metadata stamped on every emitted event

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity, time and routing information for one event
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub level: EventLevel,
    pub source: EventSource,
}

impl EventMeta {
    #[must_use]
    pub fn new(level: EventLevel, source: EventSource) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            level,
            source,
        }
    }
}

/// Severity the CLI logs an event at
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<EventLevel> for tracing::Level {
    fn from(level: EventLevel) -> Self {
        match level {
            EventLevel::Debug => tracing::Level::DEBUG,
            EventLevel::Info => tracing::Level::INFO,
            EventLevel::Warn => tracing::Level::WARN,
            EventLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Subsystem an event came from
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    General,
    Typings,
    Dist,
    Process,
}

impl EventSource {
    /// Name used as the `source` field in logs
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Typings => "typings",
            Self::Dist => "dist",
            Self::Process => "process",
        }
    }
}
