//! Operations context for dependency injection

use tsdist_config::Config;
use tsdist_errors::{Error, OpsError};
use tsdist_events::{EventEmitter, EventSender};
use tsdist_platform::{Platform, PlatformCommand, PlatformContext};

/// Operations context providing access to all system components
pub struct OpsCtx {
    /// Process and filesystem access
    pub platform: Platform,
    /// Event sender for progress reporting
    pub tx: EventSender,
    /// Merged configuration
    pub config: Config,
    /// Plan only: no process is started and nothing is removed
    pub check_mode: bool,
    /// Capture tool output instead of passing it through to the terminal
    pub capture_output: bool,
}

impl OpsCtx {
    // No public constructor - use OpsContextBuilder instead

    /// Platform context that forwards platform events to our sender
    #[must_use]
    pub fn platform_context(&self) -> PlatformContext {
        self.platform.create_context(Some(self.tx.clone()))
    }

    /// Command for `program` running in the project root
    #[must_use]
    pub fn project_command(&self, program: &str) -> PlatformCommand {
        let mut cmd = self.platform.command(program);
        cmd.current_dir(&self.config.project.root)
            .capture_output(self.capture_output);
        cmd
    }

    /// Whether failing steps should be recorded instead of aborting
    #[must_use]
    pub fn keep_going(&self) -> bool {
        self.config.general.keep_going
    }
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

/// Builder for operations context
pub struct OpsContextBuilder {
    platform: Option<Platform>,
    tx: Option<EventSender>,
    config: Option<Config>,
    check_mode: bool,
    capture_output: bool,
}

impl OpsContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            platform: None,
            tx: None,
            config: None,
            check_mode: false,
            capture_output: false,
        }
    }

    /// Set platform implementation
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Set check mode (plan only)
    #[must_use]
    pub fn with_check_mode(mut self, check_mode: bool) -> Self {
        self.check_mode = check_mode;
        self
    }

    /// Capture child process output
    #[must_use]
    pub fn with_capture_output(mut self, capture_output: bool) -> Self {
        self.capture_output = capture_output;
        self
    }

    /// Build the context
    ///
    /// # Errors
    ///
    /// Returns an error if any required component is missing.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let platform = self.platform.ok_or_else(|| OpsError::MissingComponent {
            component: "platform".to_string(),
        })?;

        let tx = self.tx.ok_or_else(|| OpsError::MissingComponent {
            component: "event_sender".to_string(),
        })?;

        let config = self.config.ok_or_else(|| OpsError::MissingComponent {
            component: "config".to_string(),
        })?;

        Ok(OpsCtx {
            platform,
            tx,
            config,
            check_mode: self.check_mode,
            capture_output: self.capture_output,
        })
    }
}

impl Default for OpsContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
