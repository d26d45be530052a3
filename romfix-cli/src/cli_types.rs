//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "romfix")]
#[command(about = "Audit a MAME ROM collection against a reference catalog", long_about = None)]
pub(crate) struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Check every set in the catalog against the archives on disk
    Audit(AuditArgs),

    /// Load a catalog source and report what it contains
    Catalog {
        /// Catalog source (MAME listxml, Logiqx XML or ClrMamePro DAT)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Manage saved default paths
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args)]
pub(crate) struct AuditArgs {
    /// Catalog source (MAME listxml, Logiqx XML or ClrMamePro DAT)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Folder holding one archive per set (defaults to the saved path, then the current directory)
    #[arg(long)]
    pub roms: Option<PathBuf>,

    /// Archive extensions to scan
    #[arg(long, value_delimiter = ',', default_value = "zip")]
    pub ext: Vec<String>,

    /// Also confirm entries by SHA1 (reads every matching entry in full)
    #[arg(long)]
    pub verify_sha1: bool,

    /// Only audit these sets
    #[arg(long = "set", value_name = "NAME", value_delimiter = ',')]
    pub sets: Vec<String>,

    /// Output format for diagnostics
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Colored, human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the settings file contents
    Show,

    /// Print the settings file path
    Path,

    /// Save the default catalog source
    SetCatalog {
        path: PathBuf,
    },

    /// Save the default ROM folder
    SetRoms {
        path: PathBuf,
    },

    /// Forget both saved paths
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_arguments_parse() {
        let cli = Cli::try_parse_from([
            "romfix",
            "audit",
            "--catalog",
            "mame.xml",
            "--ext",
            "zip,7z",
            "--set",
            "pacman,galaga",
            "--verify-sha1",
            "--format",
            "json",
        ])
        .unwrap();
        let Commands::Audit(args) = cli.command else {
            panic!("expected audit");
        };
        assert_eq!(args.catalog, Some(PathBuf::from("mame.xml")));
        assert_eq!(args.roms, None);
        assert_eq!(args.ext, vec!["zip", "7z"]);
        assert_eq!(args.sets, vec!["pacman", "galaga"]);
        assert!(args.verify_sha1);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn audit_defaults() {
        let cli = Cli::try_parse_from(["romfix", "--quiet", "audit"]).unwrap();
        assert!(cli.quiet);
        let Commands::Audit(args) = cli.command else {
            panic!("expected audit");
        };
        assert_eq!(args.ext, vec!["zip"]);
        assert_eq!(args.format, OutputFormat::Text);
        assert!(args.sets.is_empty());
    }

    #[test]
    fn config_subcommands_parse() {
        let cli = Cli::try_parse_from(["romfix", "config", "set-roms", "/roms"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::SetRoms { .. }
            }
        ));
    }
}
