//! Platform abstraction layer for tsdist operations.
//!
//! Two seams are exposed as traits so operations can be exercised without
//! touching the real system:
//! - Process execution with event emission and error mapping
//! - Filesystem queries and output-directory removal

pub mod core;
pub mod filesystem;
pub mod implementations;
pub mod process;

pub use core::{Platform, PlatformContext};
pub use implementations::native::{NativeFilesystemOperations, NativeProcessOperations};

/// Re-export commonly used types
pub use filesystem::FilesystemOperations;
pub use process::{CommandOutput, PlatformCommand, ProcessOperations};
