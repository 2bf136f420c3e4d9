// src/engine/report.rs
//! Per-action outcomes and the aggregated pass summary

use crate::config::Mode;
use std::time::Duration;

/// Why an action was not executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `--dry-run` was given
    DryRun,
    /// The action was only simulated to build the confirmation count
    PreviewOnly,
}

/// Result of one action on one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeKind {
    Success,
    Failure(String),
    Skipped(SkipReason),
}

/// One device/subject pair and what happened to it
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub serial: String,
    /// Package identifier, or APK file name in install mode
    pub subject: String,
    pub kind: OutcomeKind,
    /// Captured output of the underlying commands
    pub raw_output: String,
}

/// Running counters for a single pass over the fleet
#[derive(Debug, Clone)]
pub struct PassSummary {
    pub mode: Mode,
    /// Ready, non-skipped devices that were processed
    pub devices: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub elapsed: Duration,
    pub outcomes: Vec<ActionOutcome>,
}

impl PassSummary {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            devices: 0,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            elapsed: Duration::ZERO,
            outcomes: Vec::new(),
        }
    }

    /// Tally an outcome
    pub fn record(&mut self, outcome: ActionOutcome) {
        match outcome.kind {
            OutcomeKind::Success => self.succeeded += 1,
            OutcomeKind::Failure(_) => self.failed += 1,
            OutcomeKind::Skipped(_) => self.skipped += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Number of actions a preview pass would perform
    pub fn previewed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.kind == OutcomeKind::Skipped(SkipReason::PreviewOnly))
            .count()
    }

    /// Confirmation question shown after the preview pass
    pub fn prompt_line(&self) -> String {
        format!(
            "{} apps would be {} on {} device(s). Use '--force' to omit this prompt. Continue? [y/n]",
            self.previewed(),
            self.mode.verb(),
            self.devices
        )
    }

    /// Final summary line
    pub fn report_line(&self) -> String {
        let verb = self.mode.verb();
        let mut report = format!(
            "{} apps were {} on {} device(s).",
            self.succeeded, verb, self.devices
        );
        if self.failed > 0 {
            report.push_str(&format!(
                " {} apps could not be {} due to errors.",
                self.failed, verb
            ));
        }
        if self.skipped > 0 {
            report.push_str(&format!(" {} skipped (dry run).", self.skipped));
        }
        report.push_str(&format!(" Took {:.2} seconds.", self.elapsed.as_secs_f64()));
        report
    }
}

/// How a run ended when no fatal error occurred
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The commit (or dry-run) pass ran over at least one device
    Completed(PassSummary),
    /// No ready, non-skipped device was found
    NoReadyDevices { has_unauthorized: bool },
    /// The preview found nothing to act on
    NothingToDo,
    /// The operator did not confirm
    Declined { previewed: usize },
}
