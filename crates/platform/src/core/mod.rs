//! Core platform abstractions and context management

use tsdist_events::{EventEmitter, EventSender};

use crate::filesystem::FilesystemOperations;
use crate::implementations::native::{NativeFilesystemOperations, NativeProcessOperations};
use crate::process::{PlatformCommand, ProcessOperations};

/// Context for platform operations, providing event emission
#[derive(Clone, Default)]
pub struct PlatformContext {
    event_sender: Option<EventSender>,
}

impl PlatformContext {
    /// Create a new platform context with event emission capabilities
    #[must_use]
    pub fn new(event_sender: Option<EventSender>) -> Self {
        Self { event_sender }
    }
}

impl EventEmitter for PlatformContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

/// Main platform abstraction providing access to all platform operations
pub struct Platform {
    filesystem_ops: Box<dyn FilesystemOperations>,
    process_ops: Box<dyn ProcessOperations>,
}

impl Platform {
    /// Create a new platform instance with the specified implementations
    #[must_use]
    pub fn new(
        filesystem_ops: Box<dyn FilesystemOperations>,
        process_ops: Box<dyn ProcessOperations>,
    ) -> Self {
        Self {
            filesystem_ops,
            process_ops,
        }
    }

    /// Platform backed by the real filesystem and tokio processes
    #[must_use]
    pub fn native() -> Self {
        Self::new(
            Box::new(NativeFilesystemOperations::new()),
            Box::new(NativeProcessOperations::new()),
        )
    }

    /// Access filesystem operations
    #[must_use]
    pub fn filesystem(&self) -> &dyn FilesystemOperations {
        &*self.filesystem_ops
    }

    /// Access process operations
    #[must_use]
    pub fn process(&self) -> &dyn ProcessOperations {
        &*self.process_ops
    }

    /// Create a platform context with event emission
    #[must_use]
    pub fn create_context(&self, event_sender: Option<EventSender>) -> PlatformContext {
        PlatformContext::new(event_sender)
    }

    /// Convenience method: Create a new command builder
    #[must_use]
    pub fn command(&self, program: &str) -> PlatformCommand {
        PlatformCommand::new(program)
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::native()
    }
}
