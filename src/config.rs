// src/config.rs
//! Run configuration consumed by the fleet engine
//!
//! The CLI layer builds one `RunConfig` per invocation. The engine never
//! looks at raw argv.

use std::fmt;
use std::path::PathBuf;

/// Batch operation to perform on every selected device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Install one APK or every APK in a directory
    Install,
    /// Uninstall packages matching a filter
    Uninstall,
    /// Capture a screenshot and logcat for packages matching a filter
    BugReport,
}

impl Mode {
    /// Past participle used in preview and summary lines
    pub fn verb(&self) -> &'static str {
        match self {
            Mode::Install => "installed",
            Mode::Uninstall => "uninstalled",
            Mode::BugReport => "used for creating bug reports",
        }
    }

    /// Message printed when the preview pass finds nothing to do
    pub fn nothing_to_do(&self) -> &'static str {
        match self {
            Mode::Install => "No apps installed.",
            Mode::Uninstall => "No apps uninstalled.",
            Mode::BugReport => "No apps found for bug report.",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Install => write!(f, "install"),
            Mode::Uninstall => write!(f, "uninstall"),
            Mode::BugReport => write!(f, "bugreport"),
        }
    }
}

/// Parsed options for a single invocation
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: Mode,
    /// Install source path (install) or package filter (uninstall, bugreport)
    pub main_argument: String,
    /// Restrict the run to this device serial
    pub device: Option<String>,
    /// Keep app data on uninstall, reinstall on install
    pub keep_data: bool,
    pub dry_run: bool,
    /// Skip the confirmation prompt
    pub force: bool,
    pub skip_emulators: bool,
    pub quiet: bool,
    pub debug: bool,
    /// Explicit adb executable
    pub adb_path: Option<PathBuf>,
    /// Where pulled bug-report artifacts are written
    pub report_dir: PathBuf,
}

impl RunConfig {
    /// Create a config with every flag off
    pub fn new(mode: Mode, main_argument: impl Into<String>) -> Self {
        Self {
            mode,
            main_argument: main_argument.into(),
            device: None,
            keep_data: false,
            dry_run: false,
            force: false,
            skip_emulators: false,
            quiet: false,
            debug: false,
            adb_path: None,
            report_dir: PathBuf::from("."),
        }
    }

    /// Filter expression for the filtering modes; empty for install
    pub fn filter_string(&self) -> &str {
        match self.mode {
            Mode::Install => "",
            Mode::Uninstall | Mode::BugReport => &self.main_argument,
        }
    }

    /// Whether the interactive preview pass runs before committing
    pub fn needs_preview(&self) -> bool {
        !self.dry_run && !self.force
    }
}
