//! Filesystem operations

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tsdist_errors::PlatformError;

use crate::core::PlatformContext;

/// Trait for the filesystem queries and mutations operations need
#[async_trait]
pub trait FilesystemOperations: Send + Sync {
    /// Check if a path exists and is a directory
    async fn is_dir(&self, ctx: &PlatformContext, path: &Path) -> bool;

    /// Resolve symlinks and `..` components of an existing path
    async fn canonicalize(&self, ctx: &PlatformContext, path: &Path)
        -> Result<PathBuf, PlatformError>;

    /// Recursively remove a directory.
    ///
    /// A missing directory is not an error; returns whether anything was removed.
    async fn remove_dir_all(&self, ctx: &PlatformContext, path: &Path)
        -> Result<bool, PlatformError>;
}
