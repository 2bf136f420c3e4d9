// src/lib.rs

//! uberadb
//!
//! Drives every attached Android device through one batch operation
//! (install, uninstall or bug-report capture) using the `adb` executable.
//!
//! # Architecture
//!
//! - `parser`: `adb devices -l` and `pm list packages -f` output, plus
//!   success/failure classification of install and uninstall results
//! - `filter`: comma-separated package filters with `*` and `!` terms
//! - `engine`: preview, confirm and commit passes over the device fleet
//! - `bridge`: locating adb, running commands, and the command history

pub mod bridge;
pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
mod error;
pub mod filter;
pub mod parser;

pub use bridge::{BridgeLocation, CommandHistory, CommandOutput, CommandRunner, LocationKind};
pub use config::{Mode, RunConfig};
pub use engine::{ActionOutcome, FleetEngine, OutcomeKind, PassSummary, RunOutcome, SkipReason};
pub use error::{Error, Result};
pub use filter::{PackageFilter, find_matches, parse_filter};
pub use parser::{DeviceRecord, DeviceStatus, PackageRef};
