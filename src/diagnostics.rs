//! Unified, `miette`-based error type for the lab.
//!
//! Every failure an experiment can meet is one variant of [`LabError`]. The
//! variants follow the lifecycle: problem construction, input generation,
//! process execution, output parsing, and environment checks. Failures that
//! belong to a single experiment are recorded on that experiment and never
//! abort a sweep; see [`crate::lab::experiment`].

use miette::Diagnostic;
use thiserror::Error;

/// Type-safe failure classification, used in result records and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    UnsupportedCombination,
    InputGeneration,
    ToolProducedNoOutput,
    UnparsableOutput,
    ToolTimeout,
    MissingExecutable,
    InvalidProblem,
    InvalidTransition,
    Config,
    Io,
    Spawn,
}

impl FailureKind {
    /// Stable name used in JSON records and summary tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::UnsupportedCombination => "unsupported_combination",
            FailureKind::InputGeneration => "input_generation",
            FailureKind::ToolProducedNoOutput => "no_output",
            FailureKind::UnparsableOutput => "unparsable_output",
            FailureKind::ToolTimeout => "timeout",
            FailureKind::MissingExecutable => "missing_executable",
            FailureKind::InvalidProblem => "invalid_problem",
            FailureKind::InvalidTransition => "invalid_transition",
            FailureKind::Config => "config",
            FailureKind::Io => "io",
            FailureKind::Spawn => "spawn",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// All failure modes of the lab.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum LabError {
    #[error("{tool} does not support the '{problem}' problem")]
    #[diagnostic(
        code(combilab::dispatch::unsupported),
        help("check the support matrix with `combilab list`")
    )]
    UnsupportedCombination { problem: String, tool: String },

    #[error("failed to generate {target}: {reason}")]
    #[diagnostic(code(combilab::input::generation))]
    InputGeneration { target: String, reason: String },

    #[error("{tool} did not produce any output")]
    #[diagnostic(code(combilab::execute::no_output))]
    ToolProducedNoOutput { tool: String },

    #[error("could not read a test suite size from the output of {tool}")]
    #[diagnostic(code(combilab::execute::unparsable))]
    UnparsableOutput {
        tool: String,
        #[help]
        excerpt: Option<String>,
    },

    #[error("{program} exceeded its time limit of {timeout_ms} ms")]
    #[diagnostic(
        code(combilab::execute::timeout),
        help("raise `timeout_ms` in the lab configuration")
    )]
    ToolTimeout { program: String, timeout_ms: u64 },

    #[error("some external tools are missing: {}", missing.join("; "))]
    #[diagnostic(
        code(combilab::environment::missing_executable),
        severity(Warning),
        help("experiments involving these tools will fail")
    )]
    MissingExecutable { missing: Vec<String> },

    #[error("invalid testing problem: {message}")]
    #[diagnostic(code(combilab::problem::invalid))]
    InvalidProblem { message: String },

    #[error("experiment cannot move from {from} to {to}")]
    #[diagnostic(code(combilab::lifecycle::transition))]
    InvalidTransition { from: String, to: String },

    #[error("configuration error: {message}")]
    #[diagnostic(code(combilab::config))]
    Config { message: String },

    #[error("could not {operation} '{path}': {reason}")]
    #[diagnostic(code(combilab::io))]
    Io {
        operation: String,
        path: String,
        reason: String,
    },

    #[error("could not start '{program}': {reason}")]
    #[diagnostic(code(combilab::execute::spawn))]
    Spawn { program: String, reason: String },
}

impl LabError {
    /// Returns the type-safe classification of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            LabError::UnsupportedCombination { .. } => FailureKind::UnsupportedCombination,
            LabError::InputGeneration { .. } => FailureKind::InputGeneration,
            LabError::ToolProducedNoOutput { .. } => FailureKind::ToolProducedNoOutput,
            LabError::UnparsableOutput { .. } => FailureKind::UnparsableOutput,
            LabError::ToolTimeout { .. } => FailureKind::ToolTimeout,
            LabError::MissingExecutable { .. } => FailureKind::MissingExecutable,
            LabError::InvalidProblem { .. } => FailureKind::InvalidProblem,
            LabError::InvalidTransition { .. } => FailureKind::InvalidTransition,
            LabError::Config { .. } => FailureKind::Config,
            LabError::Io { .. } => FailureKind::Io,
            LabError::Spawn { .. } => FailureKind::Spawn,
        }
    }

    /// Builds an I/O error for an operation on a path.
    pub fn io(
        operation: impl Into<String>,
        path: impl AsRef<std::path::Path>,
        err: std::io::Error,
    ) -> Self {
        LabError::Io {
            operation: operation.into(),
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        }
    }

    pub fn invalid_problem(message: impl Into<String>) -> Self {
        LabError::InvalidProblem {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        LabError::Config {
            message: message.into(),
        }
    }
}

/// Encoders write into anonymous sinks; a failed write carries no path.
impl From<std::io::Error> for LabError {
    fn from(err: std::io::Error) -> Self {
        LabError::Io {
            operation: "write".to_string(),
            path: "<output sink>".to_string(),
            reason: err.to_string(),
        }
    }
}
