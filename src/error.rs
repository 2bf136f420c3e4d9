// src/error.rs
//! Error types for uberadb
//!
//! Only conditions that abort the whole run are modelled here. A single
//! install or uninstall that fails on one device is an `OutcomeKind::Failure`
//! and never becomes an `Error`.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that unwind to the top level
#[derive(Error, Debug)]
pub enum Error {
    /// The adb executable could not be located
    #[error("Could not find adb: {0}")]
    BridgeNotFound(String),

    /// `adb start-server` did not bring the daemon up
    #[error("Could not start adb server: {0}")]
    ServerStart(String),

    /// An external command could not be spawned at all
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A specific device was requested but is not attached or not ready
    #[error("There is no ready device attached with id '{serial}'. Found devices: {found}")]
    DeviceNotReady { serial: String, found: String },

    /// The install source is missing or holds no installable artifacts
    #[error("Invalid install source '{}': {reason}", path.display())]
    InstallSource { path: PathBuf, reason: String },

    /// The bug report output directory could not be created
    #[error("Could not create report directory '{}': {source}", path.display())]
    ReportDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No answer could be read for the confirmation prompt
    #[error("Could not read confirmation from console: {0}")]
    Prompt(String),

    /// A filter term could not be compiled
    #[error("Invalid filter term '{term}': {reason}")]
    InvalidFilter { term: String, reason: String },

    /// I/O error while writing console output or reading the install source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_not_ready_names_found_devices() {
        let err = Error::DeviceNotReady {
            serial: "abc".to_string(),
            found: "[emulator-5554 (Ready)]".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'abc'"));
        assert!(msg.contains("emulator-5554"));
    }

    #[test]
    fn test_install_source_message() {
        let err = Error::InstallSource {
            path: PathBuf::from("/tmp/none"),
            reason: "path does not exist".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid install source '/tmp/none': path does not exist"
        );
    }
}
