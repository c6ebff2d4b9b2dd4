//! Shared helpers for the integration tests.

#![allow(dead_code)]

use combilab::lab::process::{Invocation, ProcessRunner};
use combilab::LabError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A fresh, empty directory; no two calls share one, even with equal names.
pub fn scratch_dir(name: &str) -> PathBuf {
    let n = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
        "combilab-it-{}-{}-{}",
        name,
        std::process::id(),
        n
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Answers invocations by program name and remembers every call.
#[derive(Default)]
pub struct FakeRunner {
    replies: HashMap<String, Result<String, LabError>>,
    pub calls: RefCell<Vec<Invocation>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, program: &str, stdout: &str) -> Self {
        self.replies.insert(program.to_string(), Ok(stdout.to_string()));
        self
    }

    pub fn fail(mut self, program: &str, err: LabError) -> Self {
        self.replies.insert(program.to_string(), Err(err));
        self
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls.borrow().iter().map(|c| c.program.clone()).collect()
    }
}

impl ProcessRunner for FakeRunner {
    fn run(&self, invocation: &Invocation, _timeout: Duration) -> Result<String, LabError> {
        self.calls.borrow_mut().push(invocation.clone());
        self.replies
            .get(&invocation.program)
            .cloned()
            .unwrap_or_else(|| {
                Err(LabError::Spawn {
                    program: invocation.program.clone(),
                    reason: "not scripted".to_string(),
                })
            })
    }
}
