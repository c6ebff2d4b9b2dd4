//! Running external tools with a time limit.

use crate::diagnostics::LabError;
use std::ffi::OsStr;
use std::fmt;
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_string_lossy().into_owned(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs an invocation to completion and returns its standard output.
///
/// Implementations report an expired time limit as
/// [`LabError::ToolTimeout`] and a program that cannot be started as
/// [`LabError::Spawn`].
pub trait ProcessRunner {
    fn run(&self, invocation: &Invocation, timeout: Duration) -> Result<String, LabError>;
}

/// Spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation, timeout: Duration) -> Result<String, LabError> {
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| LabError::Spawn {
                program: invocation.program.clone(),
                reason: e.to_string(),
            })?;

        let mut stdout = child.stdout.take().ok_or_else(|| LabError::Spawn {
            program: invocation.program.clone(),
            reason: "failed to capture stdout".to_string(),
        })?;
        // Drained on its own thread so a chatty child never blocks on a full pipe.
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut bytes = Vec::new();
            let _ = stdout.read_to_end(&mut bytes);
            let _ = tx.send(String::from_utf8_lossy(&bytes).into_owned());
        });

        let start = Instant::now();
        let timed_out = || {
            tracing::warn!(
                program = %invocation.program,
                timeout_ms = timeout.as_millis() as u64,
                "process exceeded its time limit"
            );
            LabError::ToolTimeout {
                program: invocation.program.clone(),
                timeout_ms: timeout.as_millis() as u64,
            }
        };
        loop {
            match child.try_wait() {
                Ok(Some(status)) if status.success() => {
                    tracing::trace!(program = %invocation.program, %status, "process exited");
                    break;
                }
                Ok(Some(status)) => {
                    tracing::warn!(program = %invocation.program, %status, "process exited with failure");
                    break;
                }
                Ok(None) if start.elapsed() >= timeout => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(timed_out());
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    return Err(LabError::Spawn {
                        program: invocation.program.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        // Descendants of the child may still hold stdout open.
        let remaining = timeout.saturating_sub(start.elapsed());
        match rx.recv_timeout(remaining) {
            Ok(output) => Ok(output),
            Err(RecvTimeoutError::Timeout) => Err(timed_out()),
            Err(RecvTimeoutError::Disconnected) => Ok(String::new()),
        }
    }
}
