// tests/common/mod.rs

//! Shared test utilities: a scripted adb stand-in and engine helpers.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};
use uberadb::{
    BridgeLocation, CommandHistory, CommandOutput, CommandRunner, Error, FleetEngine,
    LocationKind, Result, RunConfig, RunOutcome,
};

pub const ADB: &str = "adb";

/// Answers adb commands from a script and remembers every call
///
/// Responses are keyed by the arguments after the executable, joined with
/// spaces. Several responses for the same key are handed out in order; the
/// last one repeats. Unscripted commands get empty output.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: HashMap<String, VecDeque<CommandOutput>>,
    failing: HashSet<String>,
    pub calls: Vec<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, args: &str, stdout: &str) -> Self {
        self.responses
            .entry(args.to_string())
            .or_default()
            .push_back(CommandOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
                exit_code: Some(0),
            });
        self
    }

    /// Make a command fail to start, as a missing executable would
    pub fn fail(mut self, args: &str) -> Self {
        self.failing.insert(args.to_string());
        self
    }

    pub fn devices(self, listing: &str) -> Self {
        self.respond("devices -l", listing)
    }

    pub fn packages(self, serial: &str, ids: &[&str]) -> Self {
        let listing: String = ids
            .iter()
            .map(|id| format!("package:/data/app/{}-1/base.apk={}\n", id, id))
            .collect();
        self.respond(&format!("-s {} shell pm list packages -f", serial), &listing)
    }

    /// Calls that change device state
    pub fn mutating_calls(&self) -> Vec<&Vec<String>> {
        self.calls
            .iter()
            .filter(|argv| {
                argv.iter().any(|a| {
                    matches!(
                        a.as_str(),
                        "install" | "uninstall" | "screencap" | "pull" | "logcat"
                    )
                })
            })
            .collect()
    }

    pub fn count_calls(&self, args: &str) -> usize {
        self.calls
            .iter()
            .filter(|argv| argv[1..].join(" ") == args)
            .count()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&mut self, argv: &[String]) -> Result<CommandOutput> {
        self.calls.push(argv.to_vec());
        let key = argv[1..].join(" ");
        if self.failing.contains(&key) {
            return Err(Error::Spawn {
                program: argv[0].clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such executable"),
            });
        }
        let output = match self.responses.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => CommandOutput::default(),
        };
        Ok(output)
    }
}

pub fn location() -> BridgeLocation {
    BridgeLocation::new(ADB, LocationKind::Path)
}

/// Result of one engine run with everything needed for assertions
pub struct Run {
    pub outcome: Result<RunOutcome>,
    pub output: String,
    pub history: CommandHistory,
}

/// Run the engine against a scripted runner with `answer` on stdin
pub fn run_engine(config: &RunConfig, runner: &mut ScriptedRunner, answer: &str) -> Run {
    let mut history = CommandHistory::new();
    let mut out = Vec::new();
    let mut input = Cursor::new(answer.as_bytes().to_vec());

    let outcome =
        FleetEngine::new(config, location(), &mut *runner, &mut history, &mut out).run(&mut input);

    Run {
        outcome,
        output: String::from_utf8(out).unwrap(),
        history,
    }
}

/// Shared buffer that tracing output is written into
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` under the same log filter the binary installs without `--debug`
pub fn with_default_logging<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
        .with_writer(move || writer.clone())
        .finish();

    let value = tracing::subscriber::with_default(subscriber, f);
    (value, logs.contents())
}
