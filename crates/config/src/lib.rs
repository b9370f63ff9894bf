#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for tsdist
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (`./tsdist.toml` or `~/.config/tsdist/config.toml`)
//! - Environment variables
//! - CLI flags (applied by the binary)

pub mod constants;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;
use tsdist_errors::{ConfigError, Error};
use tsdist_types::{ColorChoice, OutputFormat, TypeDefinition};

use constants::{
    DEFAULT_COMPILER, DEFAULT_COMPILER_FLAG, DEFAULT_DEFINITIONS, DEFAULT_DIST_DIR,
    DEFAULT_INSTALLER, DEFAULT_PACKAGES_DIR, DEFAULT_TYPINGS_DIR, PROJECT_CONFIG_FILE,
    USER_CONFIG_DIR, USER_CONFIG_FILE,
};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub typings: TypingsConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub default_output: OutputFormat,
    #[serde(default)]
    pub color: ColorChoice,
    /// Run every step even after one fails
    #[serde(default)]
    pub keep_going: bool,
}

/// Project layout, relative paths resolve against `root`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
    #[serde(default = "default_typings_dir")]
    pub typings_dir: PathBuf,
}

/// External tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_compiler")]
    pub compiler: String,
    #[serde(default = "default_compiler_args")]
    pub compiler_args: Vec<String>,
    #[serde(default = "default_installer")]
    pub installer: String,
}

/// Type-definition table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingsConfig {
    #[serde(default = "default_packages_dir")]
    pub packages_dir: PathBuf,
    #[serde(default = "default_definitions")]
    pub definitions: Vec<DefinitionEntry>,
}

/// One `[[typings.definitions]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionEntry {
    pub name: String,
    /// Explicit installer source; derived from `packages_dir` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub global: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: OutputFormat::Tty,
            color: ColorChoice::Auto,
            keep_going: false,
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            dist_dir: default_dist_dir(),
            typings_dir: default_typings_dir(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            compiler: default_compiler(),
            compiler_args: default_compiler_args(),
            installer: default_installer(),
        }
    }
}

impl Default for TypingsConfig {
    fn default() -> Self {
        Self {
            packages_dir: default_packages_dir(),
            definitions: default_definitions(),
        }
    }
}

// Default value functions for serde
fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DIST_DIR)
}

fn default_typings_dir() -> PathBuf {
    PathBuf::from(DEFAULT_TYPINGS_DIR)
}

fn default_compiler() -> String {
    DEFAULT_COMPILER.to_string()
}

fn default_compiler_args() -> Vec<String> {
    vec![DEFAULT_COMPILER_FLAG.to_string()]
}

fn default_installer() -> String {
    DEFAULT_INSTALLER.to_string()
}

fn default_packages_dir() -> PathBuf {
    PathBuf::from(DEFAULT_PACKAGES_DIR)
}

fn default_definitions() -> Vec<DefinitionEntry> {
    DEFAULT_DEFINITIONS
        .iter()
        .map(|name| DefinitionEntry {
            name: (*name).to_string(),
            source: None,
            global: false,
        })
        .collect()
}

impl Config {
    /// Get the per-user config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file does not exist, an I/O
    /// error if it exists but cannot be read, or a parse error for invalid TOML.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.display().to_string(),
                }
                .into()
            } else {
                Error::io_with_path(&e, path)
            }
        })?;

        debug!("Loaded configuration from {}", path.display());
        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: format!("{}: {e}", path.display()),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// Looks for `./tsdist.toml` first, then the per-user file.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file exists but cannot be read
    /// or contains invalid TOML.
    pub async fn load() -> Result<Self, Error> {
        let project_path = PathBuf::from(PROJECT_CONFIG_FILE);
        if fs::try_exists(&project_path).await.unwrap_or(false) {
            return Self::load_from_file(&project_path).await;
        }

        match Self::default_path() {
            Ok(user_path) if fs::try_exists(&user_path).await.unwrap_or(false) => {
                Self::load_from_file(&user_path).await
            }
            _ => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // TSDIST_OUTPUT
        if let Ok(output) = std::env::var("TSDIST_OUTPUT") {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "TSDIST_OUTPUT".to_string(),
                        value: output,
                    }
                    .into())
                }
            };
        }

        // TSDIST_COLOR
        if let Ok(color) = std::env::var("TSDIST_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "TSDIST_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        // TSDIST_KEEP_GOING
        if let Ok(keep_going) = std::env::var("TSDIST_KEEP_GOING") {
            self.general.keep_going = match keep_going.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "TSDIST_KEEP_GOING".to_string(),
                        value: keep_going,
                    }
                    .into())
                }
            };
        }

        if let Ok(compiler) = std::env::var("TSDIST_TSC") {
            self.tools.compiler = compiler;
        }

        if let Ok(installer) = std::env::var("TSDIST_TYPINGS") {
            self.tools.installer = installer;
        }

        if let Ok(root) = std::env::var("TSDIST_PROJECT_ROOT") {
            self.project.root = PathBuf::from(root);
        }

        Ok(())
    }

    /// Check the merged configuration for values the operations cannot use
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value.
    pub fn validate(&self) -> Result<(), Error> {
        if self.tools.compiler.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "tools.compiler".to_string(),
                value: self.tools.compiler.clone(),
            }
            .into());
        }

        if self.tools.installer.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "tools.installer".to_string(),
                value: self.tools.installer.clone(),
            }
            .into());
        }

        if !is_project_subdir(&self.project.dist_dir) {
            return Err(ConfigError::InvalidValue {
                field: "project.dist_dir".to_string(),
                value: self.project.dist_dir.display().to_string(),
            }
            .into());
        }

        let mut seen = HashSet::new();
        for entry in &self.typings.definitions {
            if entry.name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "typings.definitions.name".to_string(),
                    value: entry.name.clone(),
                }
                .into());
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(ConfigError::DuplicateDefinition {
                    name: entry.name.clone(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Resolve a project-relative path against the project root
    #[must_use]
    pub fn project_path(&self, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.project.root.join(relative)
        }
    }

    /// Get the build output directory
    #[must_use]
    pub fn dist_path(&self) -> PathBuf {
        self.project_path(&self.project.dist_dir)
    }

    /// Get the typings directory
    #[must_use]
    pub fn typings_path(&self) -> PathBuf {
        self.project_path(&self.project.typings_dir)
    }

    /// Get the directory sibling packages are built in
    #[must_use]
    pub fn packages_path(&self) -> PathBuf {
        self.project_path(&self.typings.packages_dir)
    }

    /// Resolve the definition table, in declaration order
    #[must_use]
    pub fn type_definitions(&self) -> Vec<TypeDefinition> {
        let packages_dir = self.packages_path();
        self.typings
            .definitions
            .iter()
            .map(|entry| match &entry.source {
                Some(source) => TypeDefinition::new(&entry.name, source, entry.global),
                None => TypeDefinition::local(&entry.name, &packages_dir, entry.global),
            })
            .collect()
    }
}

/// Relative path naming at least one directory below the project root,
/// without `..` or root components
fn is_project_subdir(path: &Path) -> bool {
    let mut named = false;
    for component in path.components() {
        match component {
            Component::Normal(_) => named = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    named
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_builtin_table() {
        let config = Config::default();
        let defs = config.type_definitions();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "matrix");
        assert_eq!(defs[0].source, "file:./../matrix/dist/matrix.d.ts");
        assert_eq!(defs[1].name, "matrix2");
        assert!(defs.iter().all(|d| !d.global));
        assert_eq!(config.tools.compiler_args, vec!["--declaration"]);
    }

    #[test]
    fn paths_resolve_against_root() {
        let mut config = Config::default();
        config.project.root = PathBuf::from("/work/app");
        assert_eq!(config.dist_path(), PathBuf::from("/work/app/dist"));
        assert_eq!(config.typings_path(), PathBuf::from("/work/app/typings"));

        config.project.dist_dir = PathBuf::from("/tmp/out");
        assert_eq!(config.dist_path(), PathBuf::from("/tmp/out"));
    }

    #[test]
    fn validate_rejects_duplicate_names() {
        let mut config = Config::default();
        config.typings.definitions.push(DefinitionEntry {
            name: "matrix".to_string(),
            source: None,
            global: true,
        });
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::DuplicateDefinition { .. })
        ));
    }

    #[test]
    fn validate_rejects_output_outside_project() {
        let mut config = Config::default();
        for dist_dir in [".", "", "./.", "..", "dist/..", "../..", "build/../../app", "/work"] {
            config.project.dist_dir = PathBuf::from(dist_dir);
            let err = config.validate().unwrap_err();
            assert!(
                matches!(
                    err,
                    Error::Config(ConfigError::InvalidValue { ref field, .. })
                        if field == "project.dist_dir"
                ),
                "{dist_dir:?} accepted"
            );
        }
    }

    #[test]
    fn validate_accepts_nested_output() {
        let mut config = Config::default();
        for dist_dir in ["dist", "./dist", "build/dist"] {
            config.project.dist_dir = PathBuf::from(dist_dir);
            assert!(config.validate().is_ok(), "{dist_dir:?} rejected");
        }
    }

    #[test]
    fn validate_rejects_blank_tools() {
        let mut config = Config::default();
        config.tools.installer = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
