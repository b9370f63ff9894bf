//! Native filesystem operations implementation

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use tsdist_errors::PlatformError;

use crate::core::PlatformContext;
use crate::filesystem::FilesystemOperations;

/// Filesystem operations backed by `tokio::fs`
pub struct NativeFilesystemOperations;

impl NativeFilesystemOperations {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for NativeFilesystemOperations {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FilesystemOperations for NativeFilesystemOperations {
    async fn is_dir(&self, _ctx: &PlatformContext, path: &Path) -> bool {
        fs::metadata(path).await.is_ok_and(|m| m.is_dir())
    }

    async fn canonicalize(
        &self,
        _ctx: &PlatformContext,
        path: &Path,
    ) -> Result<PathBuf, PlatformError> {
        fs::canonicalize(path)
            .await
            .map_err(|e| PlatformError::FilesystemOperationFailed {
                operation: format!("resolve {}", path.display()),
                message: e.to_string(),
            })
    }

    async fn remove_dir_all(
        &self,
        _ctx: &PlatformContext,
        path: &Path,
    ) -> Result<bool, PlatformError> {
        match fs::remove_dir_all(path).await {
            Ok(()) => {
                debug!("Removed {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Err(PlatformError::PermissionDenied {
                    operation: format!("remove {}", path.display()),
                    message: e.to_string(),
                })
            }
            Err(e) => Err(PlatformError::FilesystemOperationFailed {
                operation: format!("remove {}", path.display()),
                message: e.to_string(),
            }),
        }
    }
}
