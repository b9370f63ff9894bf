#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! High-level operations for tsdist
//!
//! This crate sits between the CLI and the platform layer. Each operation
//! takes an [`OpsCtx`], emits progress through its event sender and returns
//! a serializable report.

mod context;
mod dist;
mod query;
mod step;
mod typings;

pub use context::{OpsContextBuilder, OpsCtx};
pub use dist::{build_dist, DistOptions};
pub use query::list_definitions;
pub use typings::install_typings;

pub use tsdist_types::{DistReport, StepOutcome, StepReport, TypeDefinition, TypingsReport};

use tsdist_errors::Error;

/// Operation result that can be serialized for CLI output
#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OperationResult {
    /// Type-definition installation report
    TypingsReport(TypingsReport),
    /// Distribution build report
    DistReport(DistReport),
    /// Configured definition table
    Definitions(Vec<TypeDefinition>),
}

impl OperationResult {
    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(Error::from)
    }

    /// Number of steps that ran and failed (keep-going mode)
    #[must_use]
    pub fn failed_steps(&self) -> usize {
        match self {
            OperationResult::TypingsReport(report) => report.failed_steps(),
            OperationResult::DistReport(report) => report.failed_steps(),
            OperationResult::Definitions(_) => 0,
        }
    }

    /// Number of external steps the operation covered
    #[must_use]
    pub fn total_steps(&self) -> usize {
        match self {
            OperationResult::TypingsReport(report) => report.steps.len(),
            OperationResult::DistReport(report) => report.total_steps(),
            OperationResult::Definitions(_) => 0,
        }
    }

    /// Check if this is a success result
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed_steps() == 0
    }
}
