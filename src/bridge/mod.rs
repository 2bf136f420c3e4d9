// src/bridge/mod.rs
//! Access to the adb device bridge
//!
//! `locate` finds the executable, `runner` executes commands against it and
//! keeps the command history for debug output.

mod locate;
mod runner;

pub use locate::{BridgeLocation, LocationKind, Locator, locate};
pub use runner::{CommandHistory, CommandOutput, CommandRunner, ExecutedCommand, ProcessRunner};
