// src/cli.rs
//! CLI definitions for uberadb
//!
//! This module only describes the command line. The batch itself is run by
//! `commands::cmd_batch` on the `RunConfig` built here.

use crate::config::{Mode, RunConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "uberadb")]
#[command(author, version)]
#[command(about = "Install, uninstall or capture bug reports on every attached Android device", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install an APK, or every APK in a directory
    Install {
        /// Path to an .apk file or a directory containing .apk files
        apk_path: String,

        #[command(flatten)]
        options: BatchOptions,
    },

    /// Uninstall packages matching a filter
    Uninstall {
        /// Comma-separated package filter, e.g. "com.example.*,!com.example.keep"
        filter: String,

        #[command(flatten)]
        options: BatchOptions,
    },

    /// Pull a screenshot and logcat for each package matching a filter
    Bugreport {
        /// Comma-separated package filter
        filter: String,

        #[command(flatten)]
        options: BatchOptions,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Options shared by every batch command
#[derive(Args, Debug, Clone, Default)]
pub struct BatchOptions {
    /// Only use the device with this serial
    #[arg(short, long)]
    pub serial: Option<String>,

    /// Path to the adb executable (default: search PATH and the Android SDK)
    #[arg(long)]
    pub adb_path: Option<PathBuf>,

    /// Keep app data when uninstalling; reinstall (-r) when installing
    #[arg(short, long)]
    pub keep_data: bool,

    /// Show what would be done without changing any device
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub force: bool,

    /// Ignore emulators
    #[arg(long)]
    pub skip_emulators: bool,

    /// Only print the final summary and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose logging and a dump of every adb command issued
    #[arg(long)]
    pub debug: bool,

    /// Directory for pulled bug report screenshots and logs
    #[arg(long, default_value = ".")]
    pub report_dir: PathBuf,
}

impl Commands {
    /// Build the run configuration; `None` for non-batch commands
    pub fn to_config(&self) -> Option<RunConfig> {
        let (mode, argument, options) = match self {
            Commands::Install { apk_path, options } => (Mode::Install, apk_path, options),
            Commands::Uninstall { filter, options } => (Mode::Uninstall, filter, options),
            Commands::Bugreport { filter, options } => (Mode::BugReport, filter, options),
            Commands::Completions { .. } => return None,
        };

        let mut config = RunConfig::new(mode, argument.clone());
        config.device = options.serial.clone();
        config.adb_path = options.adb_path.clone();
        config.keep_data = options.keep_data;
        config.dry_run = options.dry_run;
        config.force = options.force;
        config.skip_emulators = options.skip_emulators;
        config.quiet = options.quiet;
        config.debug = options.debug;
        config.report_dir = options.report_dir.clone();
        Some(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_uninstall_flags_map_to_config() {
        let cli = Cli::try_parse_from([
            "uberadb",
            "uninstall",
            "com.demo.*",
            "-s",
            "emulator-5554",
            "--keep-data",
            "--dry-run",
            "--skip-emulators",
            "--quiet",
        ])
        .unwrap();

        let config = cli.command.to_config().unwrap();
        assert_eq!(config.mode, Mode::Uninstall);
        assert_eq!(config.filter_string(), "com.demo.*");
        assert_eq!(config.device.as_deref(), Some("emulator-5554"));
        assert!(config.keep_data && config.dry_run && config.skip_emulators && config.quiet);
        assert!(!config.force && !config.debug);
    }

    #[test]
    fn test_install_and_bugreport_defaults() {
        let cli = Cli::try_parse_from(["uberadb", "install", "./apks", "--force"]).unwrap();
        let config = cli.command.to_config().unwrap();
        assert_eq!(config.mode, Mode::Install);
        assert_eq!(config.main_argument, "./apks");
        assert!(config.force);

        let cli = Cli::try_parse_from(["uberadb", "bugreport", "com.a", "--report-dir", "/tmp/r"])
            .unwrap();
        let config = cli.command.to_config().unwrap();
        assert_eq!(config.mode, Mode::BugReport);
        assert_eq!(config.report_dir, PathBuf::from("/tmp/r"));
    }

    #[test]
    fn test_completions_has_no_config() {
        let cli = Cli::try_parse_from(["uberadb", "completions", "bash"]).unwrap();
        assert!(cli.command.to_config().is_none());
    }

    #[test]
    fn test_mode_argument_is_required() {
        assert!(Cli::try_parse_from(["uberadb", "uninstall"]).is_err());
    }
}
