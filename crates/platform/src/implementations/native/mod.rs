//! Implementations on top of tokio's process and fs modules

pub mod filesystem;
pub mod process;

pub use filesystem::NativeFilesystemOperations;
pub use process::NativeProcessOperations;
