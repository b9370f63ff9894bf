//! Platform-specific implementations

pub mod native;
