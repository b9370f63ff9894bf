//! Report type definitions for operations

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of a single external step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    Failed { exit_code: Option<i32> },
    /// Not executed (check mode)
    Skipped,
}

impl StepOutcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// One external invocation and how it went
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepReport {
    /// Human readable step name (e.g. `install matrix`)
    pub step: String,
    pub program: String,
    pub args: Vec<String>,
    pub outcome: StepOutcome,
    pub duration_ms: u64,
}

impl StepReport {
    /// Command line as it would be typed in a shell
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Type-definition installation report
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TypingsReport {
    /// One step per configured definition, in table order
    pub steps: Vec<StepReport>,
    /// Total execution time
    pub duration_ms: u64,
}

impl TypingsReport {
    #[must_use]
    pub fn success(&self) -> bool {
        !self.steps.iter().any(|s| s.outcome.is_failure())
    }

    #[must_use]
    pub fn failed_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.outcome.is_failure()).count()
    }
}

/// Distribution build report
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DistReport {
    /// Present when the typings directory was missing and got installed first
    pub typings: Option<TypingsReport>,
    /// Output directory that was cleared
    pub output_dir: PathBuf,
    /// Whether the output directory existed and was removed
    pub removed_output: bool,
    /// Compiler invocation
    pub compile: StepReport,
    /// Total execution time
    pub duration_ms: u64,
}

impl DistReport {
    #[must_use]
    pub fn success(&self) -> bool {
        self.typings.as_ref().is_none_or(TypingsReport::success)
            && !self.compile.outcome.is_failure()
    }

    #[must_use]
    pub fn failed_steps(&self) -> usize {
        self.typings.as_ref().map_or(0, TypingsReport::failed_steps)
            + usize::from(self.compile.outcome.is_failure())
    }

    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.typings.as_ref().map_or(0, |t| t.steps.len()) + 1
    }
}
