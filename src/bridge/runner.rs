// src/bridge/runner.rs
//! Blocking execution of adb commands and the per-run command history

use crate::error::{Error, Result};
use std::fmt;
use std::process::{Command, Stdio};
use tracing::debug;

/// Captured result of one external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// stdout followed by stderr, for classification of tools that mix both
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Something that can run an argv to completion
///
/// Implementations must not fail on a non-zero exit status; adb reports most
/// errors in its output text and the engine classifies that instead.
pub trait CommandRunner {
    fn run(&mut self, argv: &[String]) -> Result<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &mut R {
    fn run(&mut self, argv: &[String]) -> Result<CommandOutput> {
        (**self).run(argv)
    }
}

/// Runs commands as real child processes
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&mut self, argv: &[String]) -> Result<CommandOutput> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| Error::BridgeNotFound("empty command line".to_string()))?;

        debug!("Running: {}", argv.join(" "));

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::Spawn {
                program: program.clone(),
                source,
            })?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}

/// One entry of the command history
#[derive(Debug, Clone)]
pub struct ExecutedCommand {
    pub argv: Vec<String>,
    pub output: CommandOutput,
}

impl fmt::Display for ExecutedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.argv.join(" "))?;
        match self.output.exit_code {
            Some(code) => writeln!(f, "exit code: {}", code)?,
            None => writeln!(f, "exit code: none")?,
        }
        if !self.output.stdout.trim().is_empty() {
            writeln!(f, "stdout:\n{}", self.output.stdout.trim_end())?;
        }
        if !self.output.stderr.trim().is_empty() {
            writeln!(f, "stderr:\n{}", self.output.stderr.trim_end())?;
        }
        writeln!(f)
    }
}

/// Append-only log of every command issued during one invocation
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    entries: Vec<ExecutedCommand>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, argv: Vec<String>, output: CommandOutput) {
        self.entries.push(ExecutedCommand { argv, output });
    }

    /// Record a command that never produced output
    pub fn record_failure(&mut self, argv: Vec<String>, error: &Error) {
        self.record(
            argv,
            CommandOutput {
                stdout: String::new(),
                stderr: error.to_string(),
                exit_code: None,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for CommandHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Cmd history for debugging purpose:")?;
        writeln!(f, "-----------------------")?;
        for entry in &self.entries {
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_output() {
        let out = CommandOutput {
            stdout: "a".to_string(),
            stderr: "b".to_string(),
            exit_code: Some(0),
        };
        assert_eq!(out.combined(), "a\nb");

        let only_err = CommandOutput {
            stderr: "adb: error: failed".to_string(),
            ..Default::default()
        };
        assert_eq!(only_err.combined(), "adb: error: failed");
    }

    #[test]
    fn test_history_dump_lists_commands_in_order() {
        let mut history = CommandHistory::new();
        history.record(
            vec!["adb".to_string(), "start-server".to_string()],
            CommandOutput::default(),
        );
        history.record(
            vec!["adb".to_string(), "devices".to_string(), "-l".to_string()],
            CommandOutput {
                stdout: "List of devices attached\n".to_string(),
                stderr: String::new(),
                exit_code: Some(0),
            },
        );

        assert_eq!(history.len(), 2);
        let dump = history.to_string();
        assert!(dump.contains("Cmd history for debugging purpose:"));
        let start = dump.find("adb start-server").unwrap();
        let devices = dump.find("adb devices -l").unwrap();
        assert!(start < devices);
        assert!(dump.contains("List of devices attached"));
    }

    #[test]
    fn test_failed_command_is_kept_in_history() {
        let mut history = CommandHistory::new();
        assert!(history.is_empty());

        let err = Error::BridgeNotFound("gone".to_string());
        history.record_failure(vec!["adb".to_string(), "start-server".to_string()], &err);

        assert_eq!(history.len(), 1);
        let dump = history.to_string();
        assert!(dump.contains("adb start-server"));
        assert!(dump.contains("exit code: none"));
        assert!(dump.contains("Could not find adb: gone"));
    }

    #[test]
    fn test_process_runner_rejects_empty_argv() {
        let mut runner = ProcessRunner;
        assert!(runner.run(&[]).is_err());
    }

    #[test]
    fn test_process_runner_spawn_failure() {
        let mut runner = ProcessRunner;
        let result = runner.run(&["/nonexistent/uberadb-test-binary".to_string()]);
        assert!(matches!(result, Err(Error::Spawn { .. })));
    }
}
