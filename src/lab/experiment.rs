//! One problem on one tool, and the lifecycle that runs it.
//!
//! ```text
//! Pending -> PrerequisitesChecked -> (PrerequisitesFulfilled) -> Running -> Completed
//!                                 \___________________________\__________\-> Failed
//! ```
//!
//! Failures never escape [`Experiment::run`]; they are kept on the
//! experiment and show up in its record.

use crate::diagnostics::LabError;
use crate::encode::{jenny, tcases, EncodeContext};
use crate::lab::files::write_once;
use crate::lab::invoke::{self, tcases_generators};
use crate::lab::region::ParamValue;
use crate::lab::report::ExperimentRecord;
use crate::lab::RunContext;
use crate::problem::{inputs, ConstraintScope, Problem};
use crate::tool::{parse, ToolId};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

pub const DURATION: &str = "Duration";
pub const SIZE: &str = "Size";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Pending,
    PrerequisitesChecked,
    PrerequisitesFulfilled,
    Running,
    Completed,
    Failed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::PrerequisitesChecked => "prerequisites checked",
            Status::PrerequisitesFulfilled => "prerequisites fulfilled",
            Status::Running => "running",
            Status::Completed => "completed",
            Status::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Completed | Status::Failed)
    }

    fn can_move_to(&self, next: Status) -> bool {
        use Status::*;
        match (*self, next) {
            (Pending, PrerequisitesChecked) => true,
            (PrerequisitesChecked, PrerequisitesFulfilled | Running) => true,
            (PrerequisitesFulfilled, Running) => true,
            (Running, Completed) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an experiment is carried out, chosen from the tool and the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExperimentKind {
    /// Write the input file, run the tool on it.
    Standard,
    /// Jenny with `-w` exclusions from a universal constraint.
    JennyExclusions,
    /// Jenny extending a seed file through `-o`.
    JennyCompletion,
    /// Results read from the GBGA table; nothing is generated or run.
    TableLookup,
}

impl ExperimentKind {
    pub fn select(problem: &Problem, tool: ToolId) -> Self {
        match (tool, problem.constraint().scope()) {
            (ToolId::Gbga, _) => ExperimentKind::TableLookup,
            (ToolId::Jenny, ConstraintScope::Universal) => ExperimentKind::JennyExclusions,
            (ToolId::Jenny, ConstraintScope::Existential) => ExperimentKind::JennyCompletion,
            _ => ExperimentKind::Standard,
        }
    }
}

/// A file an experiment needs before its tool can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Input(PathBuf),
    JennySeeds(PathBuf),
    /// Shared between experiments; never cleaned.
    TcasesGenerators(PathBuf),
}

impl Artifact {
    pub fn path(&self) -> &PathBuf {
        match self {
            Artifact::Input(p) | Artifact::JennySeeds(p) | Artifact::TcasesGenerators(p) => p,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Experiment {
    id: usize,
    problem: Problem,
    tool: ToolId,
    kind: ExperimentKind,
    status: Status,
    inputs: BTreeMap<String, ParamValue>,
    outputs: BTreeMap<String, ParamValue>,
    error: Option<LabError>,
}

impl Experiment {
    pub fn new(problem: Problem, tool: ToolId) -> Self {
        let mut declared = BTreeMap::new();
        declared.insert(inputs::TOOL.to_string(), ParamValue::Text(tool.name().to_string()));
        problem.describe_inputs(&mut declared);
        Self {
            id: 0,
            kind: ExperimentKind::select(&problem, tool),
            problem,
            tool,
            status: Status::Pending,
            inputs: declared,
            outputs: BTreeMap::new(),
            error: None,
        }
    }

    pub fn with_id(mut self, id: usize) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn tool(&self) -> ToolId {
        self.tool
    }

    pub fn kind(&self) -> ExperimentKind {
        self.kind
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn error(&self) -> Option<&LabError> {
        self.error.as_ref()
    }

    pub fn inputs(&self) -> &BTreeMap<String, ParamValue> {
        &self.inputs
    }

    pub fn outputs(&self) -> &BTreeMap<String, ParamValue> {
        &self.outputs
    }

    pub fn size(&self) -> Option<i64> {
        self.outputs.get(SIZE).and_then(ParamValue::as_int)
    }

    pub fn duration_ms(&self) -> Option<i64> {
        self.outputs.get(DURATION).and_then(ParamValue::as_int)
    }

    fn transition(&mut self, next: Status) -> Result<(), LabError> {
        if !self.status.can_move_to(next) {
            return Err(LabError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        tracing::debug!(experiment = self.id, from = %self.status, to = %next, "transition");
        self.status = next;
        Ok(())
    }

    fn fail(&mut self, err: LabError) -> LabError {
        if self.status.can_move_to(Status::Failed) {
            self.status = Status::Failed;
        }
        tracing::warn!(
            experiment = self.id,
            tool = %self.tool,
            problem = %self.problem,
            kind = %err.kind(),
            "experiment failed: {}",
            err
        );
        self.error = Some(err.clone());
        err
    }

    /// Files this experiment reads; empty for table lookups.
    pub fn artifacts(&self, ctx: &RunContext<'_>) -> Vec<Artifact> {
        let data = &ctx.config.data_folder;
        let mut out = Vec::new();
        if self.kind == ExperimentKind::TableLookup {
            return out;
        }
        out.push(Artifact::Input(self.problem.filename_for(self.tool, data)));
        if self.tool == ToolId::Tcases {
            out.push(Artifact::TcasesGenerators(tcases_generators(
                data,
                self.problem.shape().t(),
            )));
        }
        if self.kind == ExperimentKind::JennyCompletion {
            if let Some(seeds) = self.problem.jenny_seed_filename(data) {
                out.push(Artifact::JennySeeds(seeds));
            }
        }
        out
    }

    /// Whether every file the experiment reads already exists.
    pub fn prerequisites_fulfilled(&self, ctx: &RunContext<'_>) -> bool {
        self.artifacts(ctx).iter().all(|a| a.path().exists())
    }

    /// Moves out of `Pending` and reports whether prerequisites already exist.
    pub fn check_prerequisites(&mut self, ctx: &RunContext<'_>) -> Result<bool, LabError> {
        self.transition(Status::PrerequisitesChecked)?;
        Ok(self.prerequisites_fulfilled(ctx))
    }

    /// Writes every missing input file.
    pub fn fulfill_prerequisites(&mut self, ctx: &RunContext<'_>) -> Result<(), LabError> {
        if self.status != Status::PrerequisitesChecked {
            return Err(LabError::InvalidTransition {
                from: self.status.to_string(),
                to: Status::PrerequisitesFulfilled.to_string(),
            });
        }
        match self.write_artifacts(ctx) {
            Ok(()) => self.transition(Status::PrerequisitesFulfilled),
            Err(e) => Err(self.fail(e)),
        }
    }

    fn write_artifacts(&self, ctx: &RunContext<'_>) -> Result<(), LabError> {
        let encode_ctx = EncodeContext {
            paths: &ctx.config.paths,
            runner: ctx.runner,
            timeout: ctx.config.timeout(),
            scratch_dir: &ctx.scratch_dir,
        };
        let wait = ctx.config.timeout();
        for artifact in self.artifacts(ctx) {
            if ctx.config.dry_run
                && self.tool.encodes_via_process()
                && matches!(artifact, Artifact::Input(_))
            {
                tracing::debug!(path = %artifact.path().display(), "dry run: reduction skipped");
                continue;
            }
            let wrote = match &artifact {
                Artifact::Input(path) => write_once(path, wait, |w| {
                    self.problem.generate_for(self.tool, w, &encode_ctx)
                })?,
                Artifact::JennySeeds(path) => {
                    write_once(path, wait, |w| jenny::write_seeds(&self.problem, w))?
                }
                Artifact::TcasesGenerators(path) => write_once(path, wait, |w| {
                    tcases::write_generators(self.problem.shape().t(), w)
                })?,
            };
            if !wrote {
                tracing::debug!(path = %artifact.path().display(), "reusing existing file");
            }
        }
        Ok(())
    }

    /// Runs the tool and records "Duration" and "Size".
    pub fn execute(&mut self, ctx: &RunContext<'_>) -> Result<(), LabError> {
        self.transition(Status::Running)?;
        match self.measure(ctx) {
            Ok(()) => {
                self.transition(Status::Completed)?;
                tracing::info!(
                    experiment = self.id,
                    tool = %self.tool,
                    problem = %self.problem,
                    size = self.size().unwrap_or_default(),
                    duration_ms = self.duration_ms().unwrap_or_default(),
                    "experiment completed"
                );
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn measure(&mut self, ctx: &RunContext<'_>) -> Result<(), LabError> {
        let s = *self.problem.shape();
        if self.kind == ExperimentKind::TableLookup {
            let entry = ctx.gbga.lookup(s.t(), s.v(), s.n()).ok_or_else(|| {
                LabError::UnparsableOutput {
                    tool: self.tool.name().to_string(),
                    excerpt: Some(format!(
                        "no published result for t={} v={} n={}",
                        s.t(),
                        s.v(),
                        s.n()
                    )),
                }
            })?;
            self.write_output(DURATION, entry.duration_ms as i64);
            self.write_output(SIZE, entry.size as i64);
            return Ok(());
        }

        if ctx.config.dry_run {
            return Err(LabError::ToolProducedNoOutput {
                tool: self.tool.name().to_string(),
            });
        }

        let prepared = invoke::prepare(&self.problem, self.tool, self.kind, ctx)?;
        tracing::debug!(experiment = self.id, command = %prepared.invocation, "running tool");
        let start = Instant::now();
        let result = ctx.runner.run(&prepared.invocation, ctx.config.timeout());
        let elapsed = start.elapsed();

        let stdout = match result {
            Ok(stdout) => stdout,
            Err(e) => {
                prepared.cleanup();
                if let LabError::ToolTimeout { timeout_ms, .. } = &e {
                    self.write_output(DURATION, *timeout_ms as i64);
                }
                return Err(e);
            }
        };
        let output = prepared.collect(stdout)?;
        if output.trim().is_empty() {
            return Err(LabError::ToolProducedNoOutput {
                tool: self.tool.name().to_string(),
            });
        }
        self.write_output(DURATION, elapsed.as_millis() as i64);
        let size = parse::parse_size(self.tool, &output)?;
        self.write_output(SIZE, size as i64);
        Ok(())
    }

    fn write_output(&mut self, name: &str, value: i64) {
        self.outputs.insert(name.to_string(), ParamValue::Int(value));
    }

    /// Drives the whole lifecycle from wherever it stands. Failures are
    /// recorded, never returned.
    pub fn run(&mut self, ctx: &RunContext<'_>) -> Status {
        if self.status.is_terminal() {
            return self.status;
        }
        if self.status == Status::Pending {
            if let Err(e) = self.check_prerequisites(ctx) {
                self.fail(e);
                return self.status;
            }
        }
        if self.status == Status::PrerequisitesChecked
            && !self.prerequisites_fulfilled(ctx)
            && self.fulfill_prerequisites(ctx).is_err()
        {
            return self.status;
        }
        if let Err(e) = self.execute(ctx) {
            if !self.status.is_terminal() {
                self.fail(e);
            }
        }
        self.status
    }

    /// Back to `Pending`, dropping outputs and any recorded error.
    pub fn reset(&mut self) {
        self.status = Status::Pending;
        self.outputs.clear();
        self.error = None;
    }

    /// Removes the experiment's own input files. Shared files stay.
    pub fn clean_prerequisites(&self, ctx: &RunContext<'_>) -> Result<(), LabError> {
        for artifact in self.artifacts(ctx) {
            if let Artifact::TcasesGenerators(_) = artifact {
                continue;
            }
            let path = artifact.path();
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(LabError::io("remove", path, e)),
            }
        }
        Ok(())
    }

    pub fn record(&self) -> ExperimentRecord {
        ExperimentRecord {
            id: self.id,
            tool: self.tool.name().to_string(),
            problem: self.problem.kind().name().to_string(),
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            status: self.status.as_str().to_string(),
            failure: self.error.as_ref().map(|e| e.kind().as_str().to_string()),
            error: self.error.as_ref().map(|e| e.to_string()),
        }
    }
}
