//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tsdist_types::ColorChoice;

/// tsdist - build helper for TypeScript libraries
#[derive(Parser)]
#[command(name = "tsdist")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Installs type definitions and regenerates the dist build of a TypeScript library")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Write debug logs to <project>/.tsdist/logs/
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show what would run without running anything
    #[arg(long, global = true)]
    pub check: bool,

    /// Run remaining steps after a tool exits non-zero
    #[arg(long, global = true)]
    pub keep_going: bool,

    /// Project root (defaults to the current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub project_root: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Install or update type definition files into the typings directory
    #[command(alias = "t")]
    Typings,

    /// Regenerate JavaScript and type definition files in the output directory
    #[command(alias = "build")]
    Dist {
        /// Do not install type definitions even if the typings directory is missing
        #[arg(long)]
        skip_typings: bool,
    },

    /// List configured type definitions
    #[command(alias = "ls")]
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_dist_flags_and_globals() {
        let cli = Cli::try_parse_from([
            "tsdist",
            "dist",
            "--skip-typings",
            "--check",
            "-C",
            "/work/app",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Dist { skip_typings: true }));
        assert!(cli.global.check);
        assert_eq!(cli.global.project_root, Some(PathBuf::from("/work/app")));
        assert!(!cli.global.keep_going);
    }

    #[test]
    fn test_aliases() {
        let cli = Cli::try_parse_from(["tsdist", "build"]).unwrap();
        assert!(matches!(cli.command, Commands::Dist { skip_typings: false }));

        let cli = Cli::try_parse_from(["tsdist", "--color", "never", "t"]).unwrap();
        assert!(matches!(cli.command, Commands::Typings));
        assert_eq!(cli.global.color, Some(ColorChoice::Never));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["tsdist"]).is_err());
    }
}
