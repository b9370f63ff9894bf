//! Type-definition entries handed to the installer

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Flag the installer understands for global-scope definitions.
pub const GLOBAL_FLAG: &str = "--global";

/// One external type-definition file to install into the typings directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Logical package name (e.g. `matrix`)
    pub name: String,
    /// Source identifier passed verbatim to the installer
    pub source: String,
    /// Install with global scope
    #[serde(default)]
    pub global: bool,
}

impl TypeDefinition {
    /// Create an entry with an explicit source identifier
    pub fn new(name: impl Into<String>, source: impl Into<String>, global: bool) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            global,
        }
    }

    /// Create an entry for a sibling package built under `packages_dir`.
    ///
    /// The source points at `<packages_dir>/<name>/dist/<name>.d.ts`.
    #[must_use]
    pub fn local(name: &str, packages_dir: &Path, global: bool) -> Self {
        let path = packages_dir
            .join(name)
            .join("dist")
            .join(format!("{name}.d.ts"));
        Self::new(name, format!("file:{}", path.display()), global)
    }

    /// Installer arguments: `install <source>` plus `--global` when global.
    #[must_use]
    pub fn install_args(&self) -> Vec<String> {
        let mut args = vec!["install".to_string(), self.source.clone()];
        if self.global {
            args.push(GLOBAL_FLAG.to_string());
        }
        args
    }
}

impl fmt::Display for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.source)?;
        if self.global {
            write!(f, " [global]")?;
        }
        Ok(())
    }
}
