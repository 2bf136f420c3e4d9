// src/engine/mod.rs

//! Fleet execution engine
//!
//! Drives every selected device through one batch operation:
//!
//! 1. Bootstrap: start the adb server and enumerate devices
//! 2. Validation: check a requested device and the install source
//! 3. Preview: simulate the whole batch and ask for confirmation
//!    (skipped for `--dry-run` and `--force`)
//! 4. Commit: run the real commands and tally the outcomes
//!
//! Package lists are fetched again in the commit pass rather than reused from
//! the preview, so changes on the device between the two passes are picked up.
//! Everything runs sequentially on the calling thread.

mod action;
mod report;

pub use action::{ActionPlan, ActionSubject, Classified, resolve_install_files};
pub use report::{ActionOutcome, OutcomeKind, PassSummary, RunOutcome, SkipReason};

use crate::bridge::{BridgeLocation, CommandHistory, CommandOutput, CommandRunner};
use crate::config::{Mode, RunConfig};
use crate::error::{Error, Result};
use crate::parser::{self, DeviceRecord, DeviceStatus, PackageRef};
use std::io::{BufRead, Write};
use std::time::Instant;
use tracing::{debug, info};

const UNAUTHORIZED_HINT: &str = "Check if you authorized your computer on your Android device. See http://stackoverflow.com/questions/23081263";

/// Which of the two passes is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Preview,
    Commit,
}

/// Executes one invocation against the attached device fleet
pub struct FleetEngine<'a, R: CommandRunner, W: Write> {
    config: &'a RunConfig,
    location: BridgeLocation,
    runner: R,
    history: &'a mut CommandHistory,
    out: W,
}

impl<'a, R: CommandRunner, W: Write> FleetEngine<'a, R, W> {
    pub fn new(
        config: &'a RunConfig,
        location: BridgeLocation,
        runner: R,
        history: &'a mut CommandHistory,
        out: W,
    ) -> Self {
        Self {
            config,
            location,
            runner,
            history,
            out,
        }
    }

    /// Run all phases, reading the confirmation answer from `input`
    pub fn run(&mut self, input: &mut dyn BufRead) -> Result<RunOutcome> {
        let devices = self.bootstrap()?;
        self.validate_device(&devices)?;
        let plan = ActionPlan::from_config(self.config)?;

        if !devices.is_empty() {
            let status = self.status_line(&devices);
            self.log(&status)?;
        }

        if self.config.needs_preview() {
            let preview = self.execute_pass(&devices, &plan, Pass::Preview)?;
            if preview.devices == 0 {
                return self.finish_without_devices(&devices);
            }
            if preview.previewed() == 0 {
                self.log_loud(plan.mode().nothing_to_do())?;
                return Ok(RunOutcome::NothingToDo);
            }
            if !self.confirm(&preview, input)? {
                info!("Operator declined {} action(s)", preview.previewed());
                return Ok(RunOutcome::Declined {
                    previewed: preview.previewed(),
                });
            }
        }

        if !self.config.dry_run {
            plan.prepare_output()?;
        }

        let summary = self.execute_pass(&devices, &plan, Pass::Commit)?;
        if summary.devices == 0 {
            return self.finish_without_devices(&devices);
        }

        self.log_loud(&summary.report_line())?;
        Ok(RunOutcome::Completed(summary))
    }

    /// Start the adb server and take the device snapshot for this run
    pub fn bootstrap(&mut self) -> Result<Vec<DeviceRecord>> {
        let started = self.adb(&["start-server"])?;
        let text = started.combined().to_lowercase();
        if text.contains("failed to start daemon") || text.contains("cannot connect to daemon") {
            return Err(Error::ServerStart(started.combined().trim().to_string()));
        }

        let listing = self.adb(&["devices", "-l"])?;
        let devices = parser::parse_devices(&listing.stdout);
        info!("Found {} device(s)", devices.len());
        Ok(devices)
    }

    /// A requested serial must be attached and ready
    pub fn validate_device(&self, devices: &[DeviceRecord]) -> Result<()> {
        let Some(serial) = &self.config.device else {
            return Ok(());
        };

        if devices.iter().any(|d| &d.serial == serial && d.is_ready()) {
            return Ok(());
        }

        let found = devices
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Err(Error::DeviceNotReady {
            serial: serial.clone(),
            found: format!("[{}]", found),
        })
    }

    fn status_line(&self, devices: &[DeviceRecord]) -> String {
        let config = self.config;
        let mut status = format!("Found {} device(s).", devices.len());

        match config.mode {
            Mode::Install => {
                status.push_str(&format!(" Installing '{}'.", config.main_argument));
            }
            Mode::Uninstall => {
                status.push_str(&format!(
                    " Uninstalling with filter '{}'.",
                    config.main_argument
                ));
                if config.keep_data {
                    status.push_str(" Keep data/caches.");
                }
            }
            Mode::BugReport => {
                status.push_str(&format!(
                    " Creating bugreport for apps with filter '{}'.",
                    config.main_argument
                ));
            }
        }

        if config.force {
            status.push_str(" Skips user prompt.");
        }

        if self.location.kind.is_default() {
            status.push_str(&format!(
                " Adb not found in PATH, use default location: {}.",
                self.location
            ));
        }

        status.push('\n');
        status
    }

    fn execute_pass(
        &mut self,
        devices: &[DeviceRecord],
        plan: &ActionPlan,
        pass: Pass,
    ) -> Result<PassSummary> {
        let started = Instant::now();
        let mut summary = PassSummary::new(plan.mode());
        debug!("Starting {:?} pass over {} device(s)", pass, devices.len());

        for device in devices {
            if self
                .config
                .device
                .as_ref()
                .is_some_and(|serial| serial != &device.serial)
            {
                continue;
            }

            let skipped = self.config.skip_emulators && device.is_emulator;
            let mut header = format!("{} [{}]", device.display_name(), device.serial);
            if device.status != DeviceStatus::Ready {
                header.push_str(&format!(": {}", device.status));
            }
            if skipped {
                header.push_str(" (skip)");
            }
            self.log(&header)?;

            if device.is_ready() && !skipped {
                summary.devices += 1;
                self.process_device(device, plan, pass, &mut summary)?;
            }

            self.log("")?;
        }

        summary.elapsed = started.elapsed();
        Ok(summary)
    }

    fn process_device(
        &mut self,
        device: &DeviceRecord,
        plan: &ActionPlan,
        pass: Pass,
        summary: &mut PassSummary,
    ) -> Result<()> {
        let installed = if plan.needs_package_list() {
            self.installed_packages(&device.serial)?
        } else {
            Vec::new()
        };

        let subjects = plan.subjects(&installed);
        for subject in &subjects {
            let label = subject.label();

            let (kind, line, raw_output) = match pass {
                Pass::Preview => (
                    OutcomeKind::Skipped(SkipReason::PreviewOnly),
                    format!("\t{}", label),
                    String::new(),
                ),
                Pass::Commit if self.config.dry_run => (
                    OutcomeKind::Skipped(SkipReason::DryRun),
                    format!("\t{}\tskip", label),
                    String::new(),
                ),
                Pass::Commit => {
                    let mut outputs = Vec::new();
                    for args in plan.commands(&device.serial, subject) {
                        outputs.push(self.adb(args.as_slice())?);
                    }
                    let classified = plan.classify(&outputs);
                    if let OutcomeKind::Failure(reason) = &classified.kind {
                        debug!("{} on {} failed: {}", label, device.serial, reason);
                    }
                    let raw = outputs
                        .iter()
                        .map(CommandOutput::combined)
                        .collect::<Vec<_>>()
                        .join("\n");
                    (
                        classified.kind,
                        format!("\t{}\t{}", label, classified.status),
                        raw,
                    )
                }
            };

            self.log(&line)?;
            summary.record(ActionOutcome {
                serial: device.serial.clone(),
                subject: label,
                kind,
                raw_output,
            });
        }

        if subjects.is_empty() && plan.needs_package_list() {
            self.log("\t No apps found for given filter")?;
        }

        Ok(())
    }

    /// Fresh package list for one device
    fn installed_packages(&mut self, serial: &str) -> Result<Vec<PackageRef>> {
        let listing = self.adb(&["-s", serial, "shell", "pm list packages -f"])?;
        Ok(parser::parse_packages(&listing.stdout))
    }

    fn confirm(&mut self, preview: &PassSummary, input: &mut dyn BufRead) -> Result<bool> {
        self.log_loud(&preview.prompt_line())?;
        self.out.flush()?;

        let mut answer = String::new();
        let read = input
            .read_line(&mut answer)
            .map_err(|e| Error::Prompt(e.to_string()))?;
        if read == 0 {
            return Err(Error::Prompt("end of input".to_string()));
        }

        let answer = answer.trim().to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }

    fn finish_without_devices(&mut self, devices: &[DeviceRecord]) -> Result<RunOutcome> {
        let has_unauthorized = devices
            .iter()
            .any(|d| d.status == DeviceStatus::Unauthorized);

        self.log_loud("No ready devices found.")?;
        if has_unauthorized {
            self.log_loud(UNAUTHORIZED_HINT)?;
        }
        Ok(RunOutcome::NoReadyDevices { has_unauthorized })
    }

    /// Run an adb subcommand and record it in the history
    fn adb<S: AsRef<str>>(&mut self, args: &[S]) -> Result<CommandOutput> {
        let argv = self.location.command(args);
        match self.runner.run(&argv) {
            Ok(output) => {
                self.history.record(argv, output.clone());
                Ok(output)
            }
            Err(e) => {
                self.history.record_failure(argv, &e);
                Err(e)
            }
        }
    }

    fn log(&mut self, msg: &str) -> Result<()> {
        if !self.config.quiet {
            writeln!(self.out, "{}", msg)?;
        }
        Ok(())
    }

    fn log_loud(&mut self, msg: &str) -> Result<()> {
        writeln!(self.out, "{}", msg)?;
        Ok(())
    }
}
