//! File names and defaults shared by the config loader and the CLI

/// Project-local configuration file, looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = "tsdist.toml";

/// Per-user configuration lives at `<config_dir>/tsdist/config.toml`
pub const USER_CONFIG_DIR: &str = "tsdist";
pub const USER_CONFIG_FILE: &str = "config.toml";

/// Debug logs go under `<project root>/.tsdist/logs`
pub const LOGS_DIR: &str = ".tsdist/logs";

pub const DEFAULT_DIST_DIR: &str = "dist";
pub const DEFAULT_TYPINGS_DIR: &str = "typings";
pub const DEFAULT_COMPILER: &str = "tsc";
pub const DEFAULT_COMPILER_FLAG: &str = "--declaration";
pub const DEFAULT_INSTALLER: &str = "typings";

/// Sibling packages are expected next to the project
pub const DEFAULT_PACKAGES_DIR: &str = "..";

/// Definitions installed when the config names none
pub const DEFAULT_DEFINITIONS: &[&str] = &["matrix", "matrix2"];
