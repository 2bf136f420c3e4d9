// src/engine/action.rs
//! Mode-specific action plans
//!
//! Each mode maps to a fixed adb command template and a rule for turning the
//! command output into an outcome. The plan is built once per run and then
//! consulted for every device in both passes.

use super::report::OutcomeKind;
use crate::bridge::CommandOutput;
use crate::config::{Mode, RunConfig};
use crate::error::{Error, Result};
use crate::filter::PackageFilter;
use crate::parser::{self, PackageRef};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APK_EXTENSION: &str = "apk";
const DEVICE_SCREENSHOT: &str = "/sdcard/bugreport.png";
const DEVICE_LOGCAT: &str = "/sdcard/bugreport_logcat.txt";

/// What a single action operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionSubject {
    /// Local APK to install
    File(PathBuf),
    /// Installed package on the device
    Package(PackageRef),
}

impl ActionSubject {
    /// Label used in per-package console lines
    pub fn label(&self) -> String {
        match self {
            ActionSubject::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            ActionSubject::Package(pkg) => pkg.identifier.clone(),
        }
    }
}

/// Result of classifying the output of one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub kind: OutcomeKind,
    /// Text shown after the subject on the console line
    pub status: String,
}

/// Per-mode action template
#[derive(Debug, Clone)]
pub enum ActionPlan {
    Install {
        files: Vec<PathBuf>,
        reinstall: bool,
    },
    Uninstall {
        filter: PackageFilter,
        keep_data: bool,
    },
    BugReport {
        filter: PackageFilter,
        report_dir: PathBuf,
    },
}

impl ActionPlan {
    /// Build the plan, validating the install source up front
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        match config.mode {
            Mode::Install => Ok(ActionPlan::Install {
                files: resolve_install_files(Path::new(&config.main_argument))?,
                reinstall: config.keep_data,
            }),
            Mode::Uninstall => Ok(ActionPlan::Uninstall {
                filter: PackageFilter::parse(config.filter_string())?,
                keep_data: config.keep_data,
            }),
            Mode::BugReport => Ok(ActionPlan::BugReport {
                filter: PackageFilter::parse(config.filter_string())?,
                report_dir: config.report_dir.clone(),
            }),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            ActionPlan::Install { .. } => Mode::Install,
            ActionPlan::Uninstall { .. } => Mode::Uninstall,
            ActionPlan::BugReport { .. } => Mode::BugReport,
        }
    }

    /// Create local destinations the commit pass writes into
    pub fn prepare_output(&self) -> Result<()> {
        if let ActionPlan::BugReport { report_dir, .. } = self {
            fs::create_dir_all(report_dir).map_err(|source| Error::ReportDir {
                path: report_dir.clone(),
                source,
            })?;
            debug!("Bug reports go to {}", report_dir.display());
        }
        Ok(())
    }

    /// Filtering modes select from the device's package list
    pub fn needs_package_list(&self) -> bool {
        !matches!(self, ActionPlan::Install { .. })
    }

    /// Everything this plan would act on for one device
    pub fn subjects(&self, installed: &[PackageRef]) -> Vec<ActionSubject> {
        match self {
            ActionPlan::Install { files, .. } => {
                files.iter().cloned().map(ActionSubject::File).collect()
            }
            ActionPlan::Uninstall { filter, .. } | ActionPlan::BugReport { filter, .. } => filter
                .find_matches(installed)
                .into_iter()
                .map(ActionSubject::Package)
                .collect(),
        }
    }

    /// adb arguments (without the executable prefix) for one action
    pub fn commands(&self, serial: &str, subject: &ActionSubject) -> Vec<Vec<String>> {
        let target = match subject {
            ActionSubject::File(path) => absolute(path).to_string_lossy().into_owned(),
            ActionSubject::Package(pkg) => pkg.identifier.clone(),
        };

        match self {
            ActionPlan::Install { reinstall, .. } => {
                let mut cmd = args(&["-s", serial, "install"]);
                if *reinstall {
                    cmd.push("-r".to_string());
                }
                cmd.push(target);
                vec![cmd]
            }
            ActionPlan::Uninstall { keep_data, .. } => {
                if *keep_data {
                    vec![args(&[
                        "-s", serial, "shell", "cmd", "package", "uninstall", "-k", target.as_str(),
                    ])]
                } else {
                    vec![args(&["-s", serial, "shell", "pm", "uninstall", target.as_str()])]
                }
            }
            ActionPlan::BugReport { report_dir, .. } => {
                let stem = format!("{}_{}", file_safe(serial), target);
                let screenshot = report_dir
                    .join(format!("{}.png", stem))
                    .to_string_lossy()
                    .into_owned();
                let logcat = report_dir
                    .join(format!("logcat_{}.txt", stem))
                    .to_string_lossy()
                    .into_owned();
                vec![
                    args(&["-s", serial, "shell", "screencap", DEVICE_SCREENSHOT]),
                    args(&["-s", serial, "pull", DEVICE_SCREENSHOT, screenshot.as_str()]),
                    args(&["-s", serial, "logcat", "-d", "-f", DEVICE_LOGCAT]),
                    args(&["-s", serial, "pull", DEVICE_LOGCAT, logcat.as_str()]),
                ]
            }
        }
    }

    /// Turn the outputs of `commands` into an outcome
    pub fn classify(&self, outputs: &[CommandOutput]) -> Classified {
        match self {
            ActionPlan::Install { .. } => {
                let text = joined(outputs);
                if parser::was_successfully_installed(&text) {
                    success("Success")
                } else {
                    failure(parser::shortened_install_status(&text))
                }
            }
            ActionPlan::Uninstall { .. } => {
                let text = joined(outputs);
                let trimmed = text.trim();
                if parser::was_successfully_uninstalled(&text) {
                    success(trimmed)
                } else if trimmed.is_empty() {
                    failure("no output")
                } else {
                    failure(trimmed)
                }
            }
            ActionPlan::BugReport { .. } => {
                let error_line = outputs
                    .iter()
                    .flat_map(|o| {
                        o.stdout
                            .lines()
                            .chain(o.stderr.lines())
                            .map(str::trim)
                            .collect::<Vec<_>>()
                    })
                    .find(|line| is_capture_error(line));
                match error_line {
                    Some(line) => failure(line),
                    None => success("report created"),
                }
            }
        }
    }
}

/// Collect the APKs named by an install argument
///
/// A file must carry the `.apk` extension; a directory contributes its
/// direct `.apk` children sorted by name.
pub fn resolve_install_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Err(Error::InstallSource {
            path: path.to_path_buf(),
            reason: "path does not exist".to_string(),
        });
    }

    let mut files = Vec::new();
    if path.is_file() {
        if is_apk(path) {
            files.push(path.to_path_buf());
        }
    } else if path.is_dir() {
        for entry in fs::read_dir(path)? {
            let entry_path = entry?.path();
            if entry_path.is_file() && is_apk(&entry_path) {
                files.push(entry_path);
            }
        }
        files.sort();
    }

    if files.is_empty() {
        return Err(Error::InstallSource {
            path: path.to_path_buf(),
            reason: "no apk files found to install".to_string(),
        });
    }

    debug!("Resolved {} apk file(s) from {}", files.len(), path.display());
    Ok(files)
}

fn is_apk(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(APK_EXTENSION))
        .unwrap_or(false)
}

fn is_capture_error(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.contains("error:") || lower.contains("no such file")
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn file_safe(serial: &str) -> String {
    serial
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

fn joined(outputs: &[CommandOutput]) -> String {
    outputs
        .iter()
        .map(CommandOutput::combined)
        .collect::<Vec<_>>()
        .join("\n")
}

fn success(status: impl Into<String>) -> Classified {
    Classified {
        kind: OutcomeKind::Success,
        status: status.into(),
    }
}

fn failure(reason: impl Into<String>) -> Classified {
    let reason = reason.into();
    Classified {
        kind: OutcomeKind::Failure(reason.clone()),
        status: reason,
    }
}
