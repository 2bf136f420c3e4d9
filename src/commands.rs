// src/commands.rs
//! Command handlers for the uberadb CLI
//!
//! Owns the per-invocation command history, runs the engine, and turns a
//! fatal error into a single error line plus the debug hint or history dump.

use crate::bridge::{self, BridgeLocation, CommandHistory, CommandRunner, ProcessRunner};
use crate::config::RunConfig;
use crate::engine::{FleetEngine, RunOutcome};
use crate::error::Result;
use std::io::{self, BufRead, Write};
use tracing::debug;

/// Process exit code for a normal run, including declined or empty batches
pub const EXIT_OK: i32 = 0;
/// Process exit code after a fatal error
pub const EXIT_FATAL: i32 = 1;

/// Run a batch against the real adb, stdin and stdout
pub fn cmd_batch(config: &RunConfig) -> i32 {
    let location = bridge::locate(config.adb_path.as_deref());
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let stderr = io::stderr();

    execute(
        config,
        location,
        ProcessRunner,
        &mut input,
        &mut stdout.lock(),
        &mut stderr.lock(),
    )
}

/// Run a batch with injected collaborators and return the exit code
pub fn execute<R: CommandRunner>(
    config: &RunConfig,
    location: Result<BridgeLocation>,
    runner: R,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> i32 {
    let mut history = CommandHistory::new();

    let result = location.and_then(|location| {
        let mut engine = FleetEngine::new(config, location, runner, &mut history, &mut *out);
        engine.run(input)
    });

    match result {
        Ok(outcome) => {
            debug!("Run finished: {}", describe(&outcome));
            if config.debug && !history.is_empty() {
                let _ = writeln!(out, "{}", history);
            }
            let _ = out.flush();
            EXIT_OK
        }
        Err(e) => {
            debug!("Run aborted: {}", e);
            let _ = writeln!(err, "{}", e);
            if config.debug {
                let _ = writeln!(err, "{}", history);
            } else {
                let _ = writeln!(err, "Run with '--debug' parameter to get additional information.");
            }
            let _ = err.flush();
            EXIT_FATAL
        }
    }
}

fn describe(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::Completed(summary) => format!(
            "{} succeeded, {} failed, {} skipped on {} device(s)",
            summary.succeeded, summary.failed, summary.skipped, summary.devices
        ),
        RunOutcome::NoReadyDevices { .. } => "no ready devices".to_string(),
        RunOutcome::NothingToDo => "nothing matched".to_string(),
        RunOutcome::Declined { previewed } => format!("declined {} action(s)", previewed),
    }
}
